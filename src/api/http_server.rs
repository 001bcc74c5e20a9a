// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{detect_handler, health_handler};
use crate::config::ServerConfig;
use crate::vision::DetectionModelManager;

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub model_manager: Arc<DetectionModelManager>,
    /// Upper bound on one detection request, if any
    pub inference_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(model_manager: Arc<DetectionModelManager>) -> Self {
        Self {
            model_manager,
            inference_timeout: None,
        }
    }

    pub fn with_inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inference_timeout = timeout;
        self
    }
}

/// Build the application router.
///
/// API routes take precedence; every other path is looked up under
/// `static_dir` and falls back to its `index.html`.
pub fn create_router(state: AppState, static_dir: &Path, max_body_bytes: usize) -> Router {
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/detect", post(detect_handler))
        .route("/api/health", get(health_handler))
        .fallback_service(spa)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_router(state, &config.static_dir, config.max_body_bytes);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
