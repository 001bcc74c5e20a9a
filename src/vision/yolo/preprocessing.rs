// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO models

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::vision::image_utils::RasterImage;

/// Default square input size of YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Grey used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Geometry of one letterbox transform, used to map boxes back to the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Source → model-input scale factor
    pub scale: f64,
    /// Left padding in model-input pixels
    pub pad_x: f64,
    /// Top padding in model-input pixels
    pub pad_y: f64,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    /// Compute the transform for a `width` x `height` source into a square `target`
    pub fn compute(width: u32, height: u32, target: u32) -> Self {
        let scale = (target as f64 / width.max(1) as f64).min(target as f64 / height.max(1) as f64);

        let new_w = ((width as f64 * scale).round() as u32).clamp(1, target);
        let new_h = ((height as f64 * scale).round() as u32).clamp(1, target);

        // Same rounding as the reference letterbox: bias the odd pixel to the right/bottom
        let pad_x = ((target - new_w) as f64 / 2.0 - 0.1).round().max(0.0);
        let pad_y = ((target - new_h) as f64 / 2.0 - 0.1).round().max(0.0);

        Self {
            scale,
            pad_x,
            pad_y,
            orig_width: width,
            orig_height: height,
        }
    }

    /// Size of the resized (unpadded) image inside the model input
    pub fn resized_dims(&self) -> (u32, u32) {
        (
            ((self.orig_width as f64 * self.scale).round() as u32).max(1),
            ((self.orig_height as f64 * self.scale).round() as u32).max(1),
        )
    }

    /// Map a point from model-input space back into source pixels
    pub fn to_source(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Letterbox `image` into a `[1, 3, target, target]` RGB tensor scaled to [0, 1]
pub fn letterbox(image: &RasterImage, target: u32) -> (Array4<f32>, Letterbox) {
    let geometry = Letterbox::compute(image.width(), image.height(), target);
    let (new_w, new_h) = geometry.resized_dims();
    let (new_w, new_h) = (new_w.min(target), new_h.min(target));

    let rgb = image.to_rgb_image();
    let resized = if (new_w, new_h) == rgb.dimensions() {
        rgb
    } else {
        imageops::resize(&rgb, new_w, new_h, FilterType::Triangle)
    };

    let size = target as usize;
    let mut tensor = Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE as f32 / 255.0);

    let offset_x = geometry.pad_x as usize;
    let offset_y = geometry.pad_y as usize;
    let copy_w = (new_w as usize).min(size.saturating_sub(offset_x));
    let copy_h = (new_h as usize).min(size.saturating_sub(offset_y));

    for y in 0..copy_h {
        for x in 0..copy_w {
            let pixel = resized.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, offset_y + y, offset_x + x]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    (tensor, geometry)
}
