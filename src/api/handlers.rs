// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(model: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            model: model.to_string(),
            version: version::VERSION_NUMBER.to_string(),
        }
    }
}

/// GET /api/health
///
/// The model is loaded before the listener binds, so a reachable server is
/// always healthy.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.model_manager.model_name()))
}
