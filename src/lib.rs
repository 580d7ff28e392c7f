// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Converts decoded RGB images into normalized NCHW float tensors
//!
//! The core is [`tensor::pack`]: a batch of same-sized images plus
//! per-channel mean/stddev become one contiguous `[batch, 3, height, width]`
//! `f32` buffer ready for a vision model's input.

pub mod config;
pub mod tensor;
pub mod version;
pub mod vision;

pub use config::PackerConfig;
pub use tensor::{
    compute_strides, pack, pack_batches, pack_with, resolve_offset, NormalizationParams,
    OffsetStrategy, PackOptions, PixelBuffer, RgbPixels, StrideOrder, TensorBuffer, TensorError,
    TensorPacker,
};
pub use vision::ResizeMode;
