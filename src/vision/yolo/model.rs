// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection on ONNX Runtime

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocessing::{decode_output, DecodeParams};
use super::preprocessing::{letterbox, YOLO_INPUT_SIZE};
use crate::vision::detection::{DetectionModel, RawDetection};
use crate::vision::image_utils::{ChannelOrder, RasterImage};
use crate::vision::labels::ClassNameTable;

/// Settings for loading a YOLO ONNX export
#[derive(Debug, Clone)]
pub struct YoloModelConfig {
    /// Path to the `.onnx` file
    pub model_path: PathBuf,
    /// Name reported by the health endpoint
    pub model_name: String,
    pub class_names: ClassNameTable,
    /// Square model input size
    pub input_size: u32,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    pub decode: DecodeParams,
}

impl Default for YoloModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolov8n.onnx"),
            model_name: "YOLOv8n".to_string(),
            class_names: ClassNameTable::coco(),
            input_size: YOLO_INPUT_SIZE,
            intra_threads: 4,
            decode: DecodeParams::default(),
        }
    }
}

/// YOLOv8 detector backed by an ONNX Runtime session
///
/// Runs on the CPU execution provider. `Session::run` needs exclusive access,
/// so the session sits behind a mutex and concurrent `infer` calls queue on it.
#[derive(Clone)]
pub struct YoloOnnxModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    model_name: String,
    class_names: ClassNameTable,
    input_size: u32,
    decode: DecodeParams,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("num_classes", &self.class_names.len())
            .finish_non_exhaustive()
    }
}

impl YoloOnnxModel {
    /// Load the model and run one warm-up inference
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - The output shape does not match the label table
    pub fn load(config: YoloModelConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("YOLO model not found: {}", model_path.display());
        }
        if config.class_names.is_empty() {
            anyhow::bail!("YOLO model needs at least one class label");
        }

        info!("Loading YOLO model from {}", model_path.display());
        let started = Instant::now();

        let session = build_session(model_path, config.intra_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("YOLO model input: {}", input_name);

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_name: config.model_name,
            class_names: config.class_names,
            input_size: config.input_size,
            decode: config.decode,
        };

        // Surfaces label/output mismatches at startup rather than on the first request
        model.warm_up().context("YOLO warm-up inference failed")?;

        info!(
            "✅ YOLO model '{}' loaded in {}ms ({} classes, input {}x{})",
            model.model_name,
            started.elapsed().as_millis(),
            model.class_names.len(),
            model.input_size,
            model.input_size
        );

        Ok(model)
    }

    fn warm_up(&self) -> Result<()> {
        let blank = image::RgbImage::from_pixel(
            self.input_size,
            self.input_size,
            image::Rgb([0, 0, 0]),
        );
        let raster = RasterImage::from_rgb(blank, ChannelOrder::Rgb)?;
        self.infer(&raster).map(|_| ())
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads.max(1))
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load YOLO model from {}",
            model_path.display()
        ))
}

impl DetectionModel for YoloOnnxModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn class_names(&self) -> &ClassNameTable {
        &self.class_names
    }

    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    fn infer(&self, image: &RasterImage) -> Result<Vec<RawDetection>> {
        let (input, geometry) = letterbox(image, self.input_size);

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("YOLO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("YOLO inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("YOLO output shape: {:?}", output_tensor.shape());

        decode_output(
            output_tensor.view(),
            self.class_names.len(),
            &self.decode,
            &geometry,
        )
    }
}
