// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime input wrapping for packed tensors

use anyhow::{Context, Result};
use ort::value::{Tensor, Value};
use tracing::debug;

use super::buffer::TensorBuffer;

impl TensorBuffer {
    /// Move the packed data into an ONNX Runtime input tensor
    ///
    /// The buffer must be rank 4; its shape becomes the tensor shape.
    pub fn into_ort_tensor(self) -> Result<Tensor<f32>> {
        let shape = self.shape().to_vec();
        let array = self
            .into_array4()
            .context("Packed buffer is not an NCHW tensor")?;

        debug!("Creating ONNX input tensor with shape {:?}", shape);
        Value::from_array(array).context("Failed to create input tensor")
    }
}
