// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint handler

use axum::{body::Bytes, extract::State, Json};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::postprocess::process;
use super::request::DetectRequest;
use super::response::DetectionResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{decode_payload, DetectionModelManager};

/// POST /api/detect - Detect objects in an image
///
/// # Request
/// - `image`: `data:image/<fmt>;base64,<data>` string (required)
///
/// # Response
/// - `detections`: class label, confidence (3 decimals) and normalized bbox
/// - `image_dimensions`: decoded width and height in pixels
/// - `total_objects`: number of detections returned
///
/// # Errors
/// - 400 Bad Request: body has no `image` key
/// - 500 Internal Server Error: anything else (malformed JSON, bad data URI,
///   undecodable image, inference failure)
pub async fn detect_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectionResponse>, ApiError> {
    debug!("Detection request received ({} bytes)", body.len());

    match detect(state, body).await {
        Ok(response) => Ok(Json(response)),
        Err(e @ ApiError::BadRequest(_)) => {
            warn!("Detection request rejected: {}", e);
            Err(e)
        }
        Err(e) => {
            error!("Error in detection: {} ({})", e, e.kind());
            Err(e)
        }
    }
}

async fn detect(state: AppState, body: Bytes) -> Result<DetectionResponse, ApiError> {
    let request = DetectRequest::from_body(&body)?;
    drop(body);

    let manager = state.model_manager.clone();
    let task = tokio::task::spawn_blocking(move || run_detection(&manager, &request.image));

    let joined = match state.inference_timeout {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            ApiError::Inference(anyhow::anyhow!(
                "Inference timed out after {}s",
                limit.as_secs_f64()
            ))
        })?,
        None => task.await,
    };

    joined.map_err(|e| ApiError::Internal(format!("Detection task failed: {}", e)))?
}

/// Decode, infer and post-process one data-URI payload.
///
/// Blocking; the HTTP handler calls this on the blocking thread pool.
pub fn run_detection(
    manager: &DetectionModelManager,
    payload: &str,
) -> Result<DetectionResponse, ApiError> {
    let start = Instant::now();

    let image = decode_payload(payload, manager.channel_order())?;
    let (width, height) = (image.width(), image.height());
    debug!("Decoded image: {}x{}", width, height);

    let (raw, class_names) = manager.infer(&image).map_err(ApiError::Inference)?;
    let response = process(&raw, class_names, width, height)?;

    info!(
        "Detection complete: {} of {} raw detections kept, {}ms",
        response.total_objects,
        raw.len(),
        start.elapsed().as_millis()
    );

    Ok(response)
}
