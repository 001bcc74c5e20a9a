// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection API endpoint module
//!
//! Provides POST /api/detect for locating objects in an uploaded image.

pub mod handler;
pub mod postprocess;
pub mod request;
pub mod response;

pub use handler::{detect_handler, run_detection};
pub use postprocess::{process, round_confidence, CONFIDENCE_THRESHOLD};
pub use request::{DetectRequest, NO_IMAGE_MESSAGE};
pub use response::{DetectionResponse, ImageDimensions, NormalizedBox, NormalizedDetection};
