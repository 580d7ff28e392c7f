// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preparation ahead of tensor packing
//!
//! Decoding is the caller's concern; this module only resizes decoded
//! images to the fixed input size a vision model expects.

pub mod resize;

pub use resize::{fit_batch, fit_to_size, ResizeMode, PAD_VALUE};
