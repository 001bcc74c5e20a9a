// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for object detection
//!
//! This module provides:
//! - Data-URI image decoding into raster buffers
//! - The `DetectionModel` boundary and its YOLOv8 ONNX implementation
//! - The process-wide model manager that serializes inference
//!
//! Inference runs on CPU via ONNX Runtime.

pub mod detection;
pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod yolo;

pub use detection::{DetectionModel, PixelBox, RawDetection};
pub use image_utils::{
    decode_image_bytes, decode_payload, ChannelOrder, DecodeError, EncodedImagePayload,
    RasterImage,
};
pub use labels::{ClassNameTable, COCO_CLASSES};
pub use model_manager::{DetectionModelInfo, DetectionModelManager, InferencePolicy};
pub use yolo::{YoloModelConfig, YoloOnnxModel};
