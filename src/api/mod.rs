use crate::proxy::middleware::{attach_access_token, require_access_token};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod common;
mod dashboard;
mod exam;
mod news;
mod pdf;
mod upload;
mod users;

/// 构建 API 路由；依赖 `build_app` 中的 request_logger 注入 `RequestId`
fn build_routes(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/tests/start", post(exam::start_test))
        .route("/api/tests/resumeTest", post(exam::resume_test))
        .route("/api/users/me", get(users::get_current_user))
        .route("/api/pdf/:subject_code", get(pdf::get_subject_pdf))
        .route(
            "/api/s3-upload",
            post(upload::upload_file)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route_layer(middleware::from_fn(require_access_token));

    let public = Router::new()
        .route("/api/news", get(news::list_news))
        .route("/api/news/featured", get(news::get_featured_news))
        .route("/api/news/:slug", get(news::get_news_article))
        .route_layer(middleware::from_fn(attach_access_token));

    Router::new()
        .merge(protected)
        .merge(public)
        // Health
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Full application: routes plus CORS and request logging.
pub fn build_app(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;
    let app = build_routes(state);

    let app = if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.layer(middleware::from_fn(common::request_logger))
}
