// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the detection server

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-yolov8-onnx-2025-10-19";

/// Semantic version number (reported by /api/health)
pub const VERSION_NUMBER: &str = "1.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 1;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "object-detection",
    "yolov8-onnx",
    "data-uri-images",
    "normalized-bboxes",
    "serialized-inference",
    "spa-static-fallback",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("SnapDetect Server {} ({})", VERSION_NUMBER, BUILD_DATE)
}
