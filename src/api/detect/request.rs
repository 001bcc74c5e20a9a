// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request parsing

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Message returned with status 400 when the body has no `image` key
pub const NO_IMAGE_MESSAGE: &str = "No image provided";

/// Request for object detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectRequest {
    /// `data:image/<fmt>;base64,<data>` payload
    pub image: String,
}

impl DetectRequest {
    /// Parse a raw request body.
    ///
    /// A body that is not JSON is an internal error (500). An object without
    /// an `image` key is a bad request (400); a non-string `image` is a 500.
    ///
    /// Other JSON values follow a membership test for `"image"`: an array or
    /// string that does not contain it is a 400, one that does is a 500 since
    /// it cannot be indexed by key, and `null`, booleans and numbers are 500.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::Internal(format!("Failed to parse JSON body: {}", e)))?;

        let image = match &value {
            serde_json::Value::Object(map) => map.get("image").ok_or_else(no_image)?,
            serde_json::Value::Array(items) => {
                if !items.iter().any(|item| item.as_str() == Some("image")) {
                    return Err(no_image());
                }
                return Err(not_indexable(&value));
            }
            serde_json::Value::String(text) => {
                if !text.contains("image") {
                    return Err(no_image());
                }
                return Err(not_indexable(&value));
            }
            _ => return Err(not_indexable(&value)),
        };

        let image = image.as_str().ok_or_else(|| {
            ApiError::Internal(format!(
                "'image' must be a data-URI string, got {}",
                json_type_name(image)
            ))
        })?;

        Ok(Self {
            image: image.to_string(),
        })
    }
}

fn no_image() -> ApiError {
    ApiError::BadRequest(NO_IMAGE_MESSAGE.to_string())
}

fn not_indexable(value: &serde_json::Value) -> ApiError {
    ApiError::Internal(format!(
        "Request body must be a JSON object, got {}",
        json_type_name(value)
    ))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
