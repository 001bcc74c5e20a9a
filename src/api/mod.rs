// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use detect::{
    detect_handler, run_detection, DetectRequest, DetectionResponse, ImageDimensions,
    NormalizedBox, NormalizedDetection,
};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use http_server::{create_router, start_server, AppState};
