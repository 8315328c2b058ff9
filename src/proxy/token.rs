//! Access token 解析
//! 优先读取 `Authorization: Bearer <token>`，否则回退到 `keycloak_tokens` Cookie 中的 JSON token 对

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::fmt;

/// Cookie holding the JSON-encoded Keycloak token pair.
pub const TOKEN_COOKIE_NAME: &str = "keycloak_tokens";

/// Keycloak token 对 (Cookie 中的 JSON)
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Cookie,
}

/// 已解析的非空 bearer token，仅在单个请求内有效
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    bearer: HeaderValue,
    source: TokenSource,
}

impl AccessToken {
    /// Returns `None` for empty tokens and for tokens that cannot be sent
    /// in an `Authorization` header (control characters etc.).
    pub fn new(value: &str, source: TokenSource) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", value)).ok()?;
        bearer.set_sensitive(true);
        Some(Self {
            value: value.to_string(),
            bearer,
            source,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// 预先校验过的 `Authorization` 头
    pub fn bearer_header(&self) -> &HeaderValue {
        &self.bearer
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// 从请求头解析 access token：Authorization 头优先于 Cookie
pub fn resolve_access_token(headers: &HeaderMap) -> Option<AccessToken> {
    bearer_from_authorization(headers).or_else(|| token_from_cookies(headers))
}

fn bearer_from_authorization(headers: &HeaderMap) -> Option<AccessToken> {
    headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            if !scheme.eq_ignore_ascii_case("bearer") {
                return None;
            }
            AccessToken::new(token, TokenSource::Header)
        })
}

fn token_from_cookies(headers: &HeaderMap) -> Option<AccessToken> {
    let raw = find_cookie(headers, TOKEN_COOKIE_NAME)?;
    let pair = parse_token_cookie(raw)?;
    AccessToken::new(&pair.access_token, TokenSource::Cookie)
}

/// First occurrence of `name` across all `Cookie` headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// 解析 Cookie 值。浏览器端的 cookie 库通常会对 JSON 进行百分号编码，两种形式都接受
pub fn parse_token_cookie(value: &str) -> Option<TokenPair> {
    if let Ok(pair) = serde_json::from_str::<TokenPair>(value) {
        return Some(pair);
    }
    let decoded = urlencoding::decode(value).ok()?;
    serde_json::from_str(&decoded).ok()
}
