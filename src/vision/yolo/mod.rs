// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection via ONNX Runtime
//!
//! Components:
//! - `preprocessing` - Letterbox resize into the square model input
//! - `postprocessing` - Output decoding and class-aware NMS
//! - `model` - ONNX session wrapper implementing `DetectionModel`

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::{YoloModelConfig, YoloOnnxModel};
pub use postprocessing::{decode_output, non_max_suppression, DecodeParams};
pub use preprocessing::{letterbox, Letterbox, YOLO_INPUT_SIZE};
