// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide owner of the loaded detection model

use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::vision::detection::{DetectionModel, RawDetection};
use crate::vision::image_utils::{ChannelOrder, RasterImage};
use crate::vision::labels::ClassNameTable;

/// Whether inference calls may overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InferencePolicy {
    /// One inference at a time, queued on a lock owned by the manager
    #[default]
    Serialized,
    /// Calls go straight to the model; only for models known to be reentrant
    Concurrent,
}

/// Summary of the loaded model for the startup log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionModelInfo {
    pub name: String,
    pub num_classes: usize,
    pub policy: InferencePolicy,
}

/// Wraps the single detection model instance shared by all requests.
///
/// The model is loaded before the server starts and never replaced. Handlers
/// receive the manager through application state, so tests can inject any
/// [`DetectionModel`].
pub struct DetectionModelManager {
    model: Arc<dyn DetectionModel>,
    policy: InferencePolicy,
    gate: Mutex<()>,
}

impl std::fmt::Debug for DetectionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionModelManager")
            .field("model", &self.model.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DetectionModelManager {
    pub fn new(model: Arc<dyn DetectionModel>, policy: InferencePolicy) -> Self {
        Self {
            model,
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn class_names(&self) -> &ClassNameTable {
        self.model.class_names()
    }

    /// Channel order the decoder must produce for this model
    pub fn channel_order(&self) -> ChannelOrder {
        self.model.channel_order()
    }

    pub fn policy(&self) -> InferencePolicy {
        self.policy
    }

    pub fn info(&self) -> DetectionModelInfo {
        DetectionModelInfo {
            name: self.model.name().to_string(),
            num_classes: self.model.class_names().len(),
            policy: self.policy,
        }
    }

    /// Run the model on `image`, returning all raw detections and the label table
    ///
    /// No confidence filtering happens here.
    pub fn infer(&self, image: &RasterImage) -> Result<(Vec<RawDetection>, &ClassNameTable)> {
        let detections = match self.policy {
            InferencePolicy::Serialized => {
                // The gate guards no data, so a poisoned lock is still usable
                let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                self.model.infer(image)?
            }
            InferencePolicy::Concurrent => self.model.infer(image)?,
        };

        tracing::debug!(
            "Model '{}' returned {} raw detections for {}x{} image",
            self.model.name(),
            detections.len(),
            image.width(),
            image.height()
        );

        Ok((detections, self.model.class_names()))
    }
}
