// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::PixelBox;

/// Box corners as fractions of image width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl NormalizedBox {
    /// Divide pixel coordinates by the image size
    pub fn from_pixels(bbox: &PixelBox, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self {
            x1: bbox.x1 / w,
            y1: bbox.y1 / h,
            x2: bbox.x2 / w,
            y2: bbox.y2 / h,
        }
    }
}

/// One detection in the public response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDetection {
    /// Class label
    #[serde(rename = "class")]
    pub class_name: String,
    /// Confidence rounded to 3 decimals
    pub confidence: f64,
    pub bbox: NormalizedBox,
}

/// Decoded image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Successful response from POST /api/detect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    /// Detections in model output order
    pub detections: Vec<NormalizedDetection>,
    pub image_dimensions: ImageDimensions,
    /// Always `detections.len()`
    pub total_objects: usize,
}

impl DetectionResponse {
    pub fn new(detections: Vec<NormalizedDetection>, width: u32, height: u32) -> Self {
        let total_objects = detections.len();
        Self {
            detections,
            image_dimensions: ImageDimensions { width, height },
            total_objects,
        }
    }
}
