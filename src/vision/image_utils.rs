// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for detection requests
//!
//! Turns a `data:image/<fmt>;base64,<data>` payload into a [`RasterImage`]:
//! an owned 3-channel, 8-bit pixel buffer laid out in the channel order the
//! detection model asks for.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use thiserror::Error;

/// Errors raised while turning a payload into pixels
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid image payload: expected '<data-uri-prefix>,<base64 data>'")]
    MissingSeparator,

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Byte order of the three color channels in a [`RasterImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// A data-URI image payload split into its prefix and base64 body.
///
/// The prefix is kept for logging only; it is never checked against a list
/// of MIME types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedImagePayload<'a> {
    prefix: &'a str,
    data: &'a str,
}

impl<'a> EncodedImagePayload<'a> {
    /// Split `raw` on its first comma.
    pub fn parse(raw: &'a str) -> Result<Self, DecodeError> {
        let (prefix, data) = raw.split_once(',').ok_or(DecodeError::MissingSeparator)?;
        Ok(Self { prefix, data })
    }

    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn data(&self) -> &'a str {
        self.data
    }

    /// Decode the base64 body into raw encoded image bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        let bytes = if self.data.bytes().any(|b| b.is_ascii_whitespace()) {
            let compact: String = self
                .data
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            STANDARD.decode(compact)?
        } else {
            STANDARD.decode(self.data)?
        };

        if bytes.is_empty() {
            return Err(DecodeError::EmptyData);
        }
        Ok(bytes)
    }
}

/// Decoded, request-scoped pixel buffer
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    order: ChannelOrder,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl RasterImage {
    /// Wrap an RGB buffer, reordering channels to `order`.
    pub fn from_rgb(image: RgbImage, order: ChannelOrder) -> Result<Self, DecodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions { width, height });
        }

        let mut pixels = image.into_raw();
        if order == ChannelOrder::Bgr {
            swap_red_blue(&mut pixels);
        }

        Ok(Self {
            width,
            height,
            order,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    /// Interleaved pixel bytes in [`Self::channel_order`]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at (x, y) in stored channel order
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Copy into an RGB image regardless of stored order
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut raw = self.pixels.clone();
        if self.order == ChannelOrder::Bgr {
            swap_red_blue(&mut raw);
        }
        // Length is width * height * 3 by construction
        RgbImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}

/// Decode raw encoded image bytes (PNG, JPEG, WebP, GIF, BMP, ...)
pub fn decode_image_bytes(bytes: &[u8], order: ChannelOrder) -> Result<RasterImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

    RasterImage::from_rgb(img.to_rgb8(), order)
}

/// Decode a `data:<mime>;base64,<data>` payload into a raster image
///
/// # Example
/// ```ignore
/// let raster = decode_payload("data:image/jpeg;base64,/9j/4AAQ...", ChannelOrder::Rgb)?;
/// println!("{}x{}", raster.width(), raster.height());
/// ```
pub fn decode_payload(raw: &str, order: ChannelOrder) -> Result<RasterImage, DecodeError> {
    let payload = EncodedImagePayload::parse(raw)?;
    let bytes = payload.decode_bytes()?;
    tracing::debug!(
        prefix = payload.prefix(),
        size_bytes = bytes.len(),
        "Decoding image payload"
    );
    decode_image_bytes(&bytes, order)
}
