use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use portal_gateway::api::build_app;
use portal_gateway::core::models::GatewayConfig;
use portal_gateway::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN_COOKIE: &str = r#"keycloak_tokens={"access_token":"abc","refresh_token":"r-1"}"#;

fn app_with_backend(base_url: &str) -> Router {
    let mut config = GatewayConfig::default();
    config.backend.base_url = Some(base_url.to_string());
    config.max_upload_bytes = 1024;
    build_app(Arc::new(AppState::new(config).unwrap()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

/// 有 Authorization 头时，无论 Cookie 内容如何都使用头里的 token
#[tokio::test]
async fn test_header_token_wins_over_cookie() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/dashboard")
                .header("authorization", "Bearer from-header");
            then.status(200)
                .json_body(json!({ "success": true, "data": { "streak": 4 } }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/dashboard")
        .header("authorization", "Bearer from-header")
        .header("cookie", TOKEN_COOKIE)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": { "streak": 4 } }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cookie_token_is_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/me")
                .header("authorization", "Bearer abc")
                .header("cache-control", "no-store");
            then.status(200)
                .json_body(json!({ "success": true, "user": { "id": 7 } }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/users/me")
        .header("cookie", TOKEN_COOKIE)
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_percent_encoded_cookie_is_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/dashboard")
                .header("authorization", "Bearer abc");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/dashboard")
        .header(
            "cookie",
            "locale=en; keycloak_tokens=%7B%22access_token%22%3A%22abc%22%7D",
        )
        .body(Body::empty())
        .unwrap();

    let (status, _) = send_json(app, request).await;
    assert_eq!(status, StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_token_is_401_without_backend_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/dashboard");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let (status, body) = send_json(
        app,
        get("/api/dashboard").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Unauthorized: no access token provided" })
    );
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_malformed_cookie_is_401() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/tests/start");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/start")
        .header("cookie", "keycloak_tokens={not json")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"subjectCode":"MATH"}"#))
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(mock.hits_async().await, 0);
}

/// Cookie 中的 token 无法放进 Authorization 头时按未登录处理
#[tokio::test]
async fn test_cookie_token_with_control_chars_is_401() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/dashboard");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/dashboard")
        .header(
            "cookie",
            "keycloak_tokens=%7B%22access_token%22%3A%22a%5Cnb%22%7D",
        )
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Unauthorized: no access token provided" })
    );
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_backend_403_is_relayed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dashboard");
            then.status(403)
                .json_body(json!({ "success": false, "message": "Forbidden" }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/dashboard")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "success": false, "message": "Forbidden" }));
}

#[tokio::test]
async fn test_network_failure_is_500_envelope() {
    // Nothing listens on port 1.
    let app = app_with_backend("http://127.0.0.1:1");
    let request = get("/api/users/me")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_non_json_backend_body_is_500() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/users/me")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid response from backend" })
    );
}

#[tokio::test]
async fn test_empty_backend_body_keeps_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me");
            then.status(404);
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/users/me")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Not Found" }));
}

#[tokio::test]
async fn test_start_test_forwards_json_body_and_status() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/tests/start")
                .header("authorization", "Bearer abc")
                .header("content-type", "application/json")
                .json_body(json!({ "subjectCode": "MATH", "questionCount": 20 }));
            then.status(201)
                .json_body(json!({ "success": true, "testId": "t-42" }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/start")
        .header("cookie", TOKEN_COOKIE)
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"subjectCode":"MATH","questionCount":20}"#,
        ))
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["testId"], json!("t-42"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_resume_test_with_malformed_body_is_500() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/tests/resumeTest");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/resumeTest")
        .header("authorization", "Bearer abc")
        .body(Body::from("{\"testId\":"))
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid request body" })
    );
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_resume_test_without_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/tests/resumeTest")
                .header("authorization", "Bearer abc");
            then.status(200)
                .json_body(json!({ "success": true, "resumed": false }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/tests/resumeTest")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resumed"], json!(false));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_news_is_public_and_forwards_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/news")
                .query_param("page", "2")
                .query_param("limit", "5")
                .header_missing("authorization");
            then.status(200)
                .json_body(json!({ "success": true, "items": [] }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let (status, body) = send_json(
        app,
        get("/api/news?page=2&limit=5").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_news_article_attaches_token_when_present() {
    let server = MockServer::start_async().await;
    let featured = server
        .mock_async(|when, then| {
            when.method(GET).path("/news/featured");
            then.status(200)
                .json_body(json!({ "success": true, "featured": true }));
        })
        .await;
    let article = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/news/exam-dates-2026")
                .header("authorization", "Bearer abc");
            then.status(200)
                .json_body(json!({ "success": true, "slug": "exam-dates-2026" }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let (status, body) = send_json(
        app.clone(),
        get("/api/news/exam-dates-2026")
            .header("cookie", TOKEN_COOKIE)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], json!("exam-dates-2026"));
    article.assert_async().await;

    let (status, body) = send_json(
        app,
        get("/api/news/featured").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["featured"], json!(true));
    featured.assert_async().await;
}

#[tokio::test]
async fn test_pdf_is_streamed_with_content_type() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/pdf/MATH-101")
                .header("authorization", "Bearer abc");
            then.status(200)
                .header("content-type", "application/pdf")
                .header("content-disposition", "inline; filename=\"MATH-101.pdf\"")
                .body("%PDF-1.4 fake");
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/pdf/MATH-101")
        .header("authorization", "Bearer abc")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "application/pdf");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "inline; filename=\"MATH-101.pdf\""
    );
    assert_eq!(body, b"%PDF-1.4 fake");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_pdf_requires_token() {
    let app = app_with_backend("http://127.0.0.1:1");
    let (status, _) = send_json(
        app,
        get("/api/pdf/MATH-101").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_forwards_raw_body_and_content_type() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/s3-upload")
                .header("authorization", "Bearer abc")
                .header("content-type", "text/csv")
                .body("a,b\n1,2\n");
            then.status(200)
                .json_body(json!({ "success": true, "key": "uploads/abc.csv" }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/s3-upload")
        .header("cookie", TOKEN_COOKIE)
        .header("content-type", "text/csv")
        .body(Body::from("a,b\n1,2\n"))
        .unwrap();

    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], json!("uploads/abc.csv"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected_before_backend() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/s3-upload");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = Request::builder()
        .method("POST")
        .uri("/api/s3-upload")
        .header("authorization", "Bearer abc")
        .header("content-type", "application/octet-stream")
        .body(Body::from(vec![0u8; 4096]))
        .unwrap();

    let (status, headers, body) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(headers["content-type"], "application/json");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/dashboard")
                .header("x-request-id", "req-123");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let app = app_with_backend(&server.base_url());
    let request = get("/api/dashboard")
        .header("authorization", "Bearer abc")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-request-id").unwrap(), "req-123");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_healthz() {
    let app = app_with_backend("http://127.0.0.1:1");
    let (status, _, body) = send(app, get("/healthz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
