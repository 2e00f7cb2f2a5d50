//! Web 服务器模块
//!
//! 把查词、段落生成和翻译以 HTTP 接口提供给阅读页面。

pub mod client;
pub mod handlers;
pub mod routes;
pub mod types;

pub use client::ClientKey;
pub use routes::create_routes;
pub use types::*;

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{ReaderError, Result};
use crate::rate_limit::SlidingWindowLimiter;
use crate::service::ReaderServices;

impl AppState {
    /// 按配置构建服务和速率限制器
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            services: ReaderServices::from_config(config),
            limiter: Arc::new(SlidingWindowLimiter::from_config(&config.settings.rate_limit)),
            credentials: config.credentials.report().clone(),
        }
    }
}

/// Web 服务器
pub struct WebServer {
    config: AppConfig,
}

impl WebServer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 启动 Web 服务器，收到 Ctrl-C 后停止
    pub async fn start(&self) -> Result<()> {
        let state = Arc::new(AppState::from_config(&self.config));

        let rate_limit = &self.config.settings.rate_limit;
        let sweep_interval = Duration::from_secs(rate_limit.sweep_interval_secs);
        let sweeper = state.limiter.spawn_sweeper(sweep_interval);

        let app = create_router(state);

        let address = self.config.settings.server.listen_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ReaderError::Custom(format!("Failed to bind server: {}", e)))?;

        info!("Web server starting at http://{}", address);

        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        sweeper.abort();
        served.map_err(|e| ReaderError::Custom(format!("Server error: {}", e)))?;

        info!("Web server stopped");
        Ok(())
    }
}

/// 创建路由器
pub fn create_router(state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
