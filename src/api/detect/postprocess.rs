// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Raw model output → public detection response

use super::response::{DetectionResponse, NormalizedBox, NormalizedDetection};
use crate::api::errors::ApiError;
use crate::vision::{ClassNameTable, RawDetection};

/// Detections at or below this confidence are dropped
pub const CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Decimal places kept in the reported confidence
pub const CONFIDENCE_DECIMALS: usize = 3;

/// Round to [`CONFIDENCE_DECIMALS`] places from the exact decimal value of
/// `confidence`, so 0.3005 (stored just below) becomes 0.3 rather than 0.301.
pub fn round_confidence(confidence: f64) -> f64 {
    format!("{:.*}", CONFIDENCE_DECIMALS, confidence)
        .parse()
        .unwrap_or(confidence)
}

/// Build the response for one image.
///
/// Per detection, in order: label lookup, rounding, normalization, then the
/// threshold test against the *unrounded* confidence. Output keeps model
/// order; nothing is sorted, merged or suppressed here.
///
/// # Errors
/// An id missing from `class_names` fails the whole request, even when that
/// detection would have been filtered out.
pub fn process(
    raw: &[RawDetection],
    class_names: &ClassNameTable,
    width: u32,
    height: u32,
) -> Result<DetectionResponse, ApiError> {
    if width == 0 || height == 0 {
        return Err(ApiError::Internal(format!(
            "Invalid image dimensions: {}x{}",
            width, height
        )));
    }

    let mut detections = Vec::with_capacity(raw.len());

    for det in raw {
        let class_name = class_names.get(det.class_id).ok_or_else(|| {
            ApiError::Internal(format!(
                "Unknown class id {} (model has {} classes)",
                det.class_id,
                class_names.len()
            ))
        })?;

        let normalized = NormalizedDetection {
            class_name: class_name.to_string(),
            confidence: round_confidence(det.confidence),
            bbox: NormalizedBox::from_pixels(&det.bbox, width, height),
        };

        if det.confidence > CONFIDENCE_THRESHOLD {
            detections.push(normalized);
        }
    }

    Ok(DetectionResponse::new(detections, width, height))
}
