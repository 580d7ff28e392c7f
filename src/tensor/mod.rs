// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image batch to tensor conversion
//!
//! This module provides:
//! - Stride computation and offset resolution for dense layouts
//! - Packing of RGB image batches into normalized NCHW f32 buffers
//! - An eight-lane offset kernel (feature `simd`) and per-image rayon workers (feature `parallel`)

pub mod buffer;
pub mod errors;
pub mod normalization;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod packer;
pub mod pixels;
#[cfg(feature = "simd")]
mod simd;
pub mod strides;

// Re-export commonly used types
pub use buffer::TensorBuffer;
pub use errors::{ErrorKind, Result, TensorError};
pub use normalization::{NormalizationParams, IMAGENET_MEAN, IMAGENET_STD};
pub use packer::{
    pack, pack_batches, pack_with, OffsetStrategy, PackOptions, TensorPacker, BATCH_AXIS,
    CHANNEL_AXIS, HEIGHT_AXIS, WIDTH_AXIS,
};
pub use pixels::{PixelBuffer, RgbPixels, RGB_CHANNELS};
pub use strides::{compute_strides, element_count, resolve_offset, unravel_offset, StrideOrder};
