// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use snapdetect_server::{
    api::{start_server, AppState},
    config::ServerConfig,
    version,
    vision::{DetectionModelManager, YoloOnnxModel},
};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    tracing::info!("Starting {}", version::get_version_string());
    tracing::info!("Build version: {}", version::VERSION);

    let model_config = config.yolo_model_config()?;
    tracing::info!("Loading detection model from {}", config.model_path.display());
    let model = YoloOnnxModel::load(model_config)
        .with_context(|| format!("Failed to load model {}", config.model_path.display()))?;

    let manager = Arc::new(DetectionModelManager::new(
        Arc::new(model),
        config.inference_policy,
    ));
    let info = manager.info();
    tracing::info!(
        "Detection model '{}' ready ({} classes, {:?} inference)",
        info.name,
        info.num_classes,
        info.policy
    );
    let state = AppState::new(manager).with_inference_timeout(config.inference_timeout());

    tracing::info!("Serving client bundle from {}", config.static_dir.display());
    let index = config.index_file();
    if !index.is_file() {
        tracing::warn!(
            "{} not found; non-API paths will return 404 until the frontend is built",
            index.display()
        );
    }

    start_server(&config, state).await
}
