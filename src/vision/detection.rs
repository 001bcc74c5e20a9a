// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model boundary
//!
//! A [`DetectionModel`] is an opaque function of one raster image to a list
//! of [`RawDetection`]s in source-pixel coordinates. Anything that shapes the
//! public response (thresholds, normalization, rounding) lives outside it.

use anyhow::Result;

use super::image_utils::{ChannelOrder, RasterImage};
use super::labels::ClassNameTable;

/// Axis-aligned box in absolute pixel coordinates (x1, y1) - (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PixelBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &PixelBox) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;

        if union > f64::EPSILON {
            inter / union
        } else {
            0.0
        }
    }

    /// Clamp all corners into [0, width] x [0, height]
    pub fn clip(&self, width: f64, height: f64) -> Self {
        Self {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        }
    }
}

/// One unfiltered model output
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    /// Model score in [0, 1]
    pub confidence: f64,
    pub bbox: PixelBox,
}

/// An object-detection model loaded once per process.
///
/// Implementations must be callable from several threads; whether calls may
/// actually overlap is decided by
/// [`InferencePolicy`](super::model_manager::InferencePolicy).
pub trait DetectionModel: Send + Sync {
    /// Display name reported by the health endpoint
    fn name(&self) -> &str;

    /// Label table fixed at load time
    fn class_names(&self) -> &ClassNameTable;

    /// Channel layout `infer` expects its input in
    fn channel_order(&self) -> ChannelOrder;

    /// Run the model on one image. Returns every detection it produces.
    fn infer(&self, image: &RasterImage) -> Result<Vec<RawDetection>>;
}
