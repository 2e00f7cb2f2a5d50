//! Web 路由定义

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::{handlers::*, types::AppState};

/// 创建 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/define", get(define))
        .route("/generate", get(generate))
        .route("/translate", post(translate))
        .route("/env-check", get(env_check))
}
