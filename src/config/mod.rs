// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration from command-line flags and environment variables

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::vision::{ClassNameTable, InferencePolicy, YoloModelConfig};

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// SnapDetect object detection server
#[derive(Parser, Debug, Clone)]
#[command(name = "snapdetect-server")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Object detection HTTP service backed by YOLOv8 on ONNX Runtime", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 5000)]
    pub port: u16,

    /// YOLOv8 ONNX export
    #[arg(long, env = "MODEL_PATH", default_value = "./models/yolov8n.onnx")]
    pub model_path: PathBuf,

    /// Model name reported by /api/health
    #[arg(long, env = "MODEL_NAME", default_value = "YOLOv8n")]
    pub model_name: String,

    /// Class labels, one per line (COCO-80 when omitted)
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// Built single-page app served for non-API paths
    #[arg(long, env = "STATIC_DIR", default_value = "./frontend/build")]
    pub static_dir: PathBuf,

    /// Square model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    #[arg(long, env = "INFERENCE_POLICY", value_enum, default_value_t = InferencePolicy::Serialized)]
    pub inference_policy: InferencePolicy,

    /// Fail a detection request after this many seconds (disabled when omitted)
    #[arg(long, env = "INFERENCE_TIMEOUT_SECS")]
    pub inference_timeout_secs: Option<u64>,

    /// Largest accepted request body
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("./models/yolov8n.onnx"),
            model_name: "YOLOv8n".to_string(),
            labels_path: None,
            static_dir: PathBuf::from("./frontend/build"),
            input_size: 640,
            intra_threads: 4,
            inference_policy: InferencePolicy::Serialized,
            inference_timeout_secs: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            bail!(
                "input size must be a positive multiple of 32, got {}",
                self.input_size
            );
        }
        if self.max_body_bytes == 0 {
            bail!("max body size must be non-zero");
        }
        if self.inference_timeout_secs == Some(0) {
            bail!("inference timeout must be at least one second");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_secs.map(Duration::from_secs)
    }

    /// Entry file served for every unmatched path
    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }

    /// Model settings, reading the labels file if one is configured
    pub fn yolo_model_config(&self) -> Result<YoloModelConfig> {
        let class_names = match &self.labels_path {
            Some(path) => ClassNameTable::from_file(path)?,
            None => ClassNameTable::coco(),
        };

        Ok(YoloModelConfig {
            model_path: self.model_path.clone(),
            model_name: self.model_name.clone(),
            class_names,
            input_size: self.input_size,
            intra_threads: self.intra_threads,
            ..Default::default()
        })
    }
}
