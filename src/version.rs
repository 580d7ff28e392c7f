// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir vision tensor packer

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-nchw-packing-2025-11-04";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Major version number
pub const VERSION_MAJOR: u32 = 0;

/// Minor version number
pub const VERSION_MINOR: u32 = 1;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-04";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "nchw-packing",
    "imagenet-normalization",
    "row-major-strides",
    "column-major-strides",
    "batch-splitting",
    "center-crop-resize",
    "letterbox-resize",
    #[cfg(feature = "simd")]
    "vectorized-offsets",
    #[cfg(feature = "parallel")]
    "parallel-packing",
    #[cfg(feature = "onnx")]
    "onnx-input",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Vision Tensor {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for diagnostics
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
