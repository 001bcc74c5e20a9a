// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLOv8 output tensors
//!
//! The export emits one row per anchor: `cx, cy, w, h` in model-input pixels
//! followed by one score per class. Rows are thresholded, suppressed with
//! class-aware NMS and mapped back onto the source image.

use anyhow::Result;
use ndarray::{ArrayViewD, Ix3};

use super::preprocessing::Letterbox;
use crate::vision::detection::{PixelBox, RawDetection};

/// Candidate score threshold applied inside the model
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;

/// IoU above which a lower-scored box of the same class is suppressed
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.7;

/// Upper bound on detections returned per image
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

/// Upper bound on candidates entering NMS
pub const MAX_NMS_CANDIDATES: usize = 30_000;

/// Model-internal decoding parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    pub conf_threshold: f32,
    pub iou_threshold: f64,
    pub max_detections: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
        }
    }
}

/// Decode a `[1, 4 + C, N]` or `[1, N, 4 + C]` output into source-space detections
///
/// Result is sorted by confidence, highest first.
pub fn decode_output(
    output: ArrayViewD<f32>,
    num_classes: usize,
    params: &DecodeParams,
    letterbox: &Letterbox,
) -> Result<Vec<RawDetection>> {
    let output = output
        .into_dimensionality::<Ix3>()
        .map_err(|_| anyhow::anyhow!("Unexpected YOLO output rank, expected [1, 4 + classes, anchors]"))?;

    let shape = output.shape();
    if shape[0] != 1 {
        anyhow::bail!("Unexpected YOLO batch size {}, expected 1", shape[0]);
    }

    let features = 4 + num_classes;
    // Anchors normally outnumber features; check the channel-first layout first
    let rows = if shape[1] == features {
        output.index_axis(ndarray::Axis(0), 0).reversed_axes()
    } else if shape[2] == features {
        output.index_axis(ndarray::Axis(0), 0)
    } else {
        anyhow::bail!(
            "YOLO output shape {:?} does not match {} classes (expected {} features)",
            shape,
            num_classes,
            features
        );
    };

    let mut candidates = Vec::new();
    for row in rows.rows() {
        let (class_id, score) = row
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (idx, &s)| {
                if s > best.1 {
                    (idx, s)
                } else {
                    best
                }
            });

        if !score.is_finite() || score <= params.conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0] as f64, row[1] as f64, row[2] as f64, row[3] as f64);
        if !(cx.is_finite() && cy.is_finite() && w.is_finite() && h.is_finite()) {
            continue;
        }

        candidates.push(RawDetection {
            class_id,
            confidence: score as f64,
            bbox: PixelBox::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0),
        });
    }

    let kept = non_max_suppression(candidates, params.iou_threshold, params.max_detections);

    let (width, height) = (letterbox.orig_width as f64, letterbox.orig_height as f64);
    Ok(kept
        .into_iter()
        .map(|det| {
            let (x1, y1) = letterbox.to_source(det.bbox.x1, det.bbox.y1);
            let (x2, y2) = letterbox.to_source(det.bbox.x2, det.bbox.y2);
            RawDetection {
                bbox: PixelBox::new(x1, y1, x2, y2).clip(width, height),
                ..det
            }
        })
        .collect())
}

/// Greedy class-aware NMS. Output is ordered by confidence, highest first.
pub fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f64,
    max_detections: usize,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates.truncate(MAX_NMS_CANDIDATES);

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
