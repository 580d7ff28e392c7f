// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Packed float tensor handed to the caller

use ndarray::{Array4, ArrayD, IxDyn};

use super::errors::{Result, TensorError};
use super::strides::resolve_offset;

/// Flat, contiguous f32 storage with its shape and row-major strides
///
/// Produced fully initialized by the packer and owned by the caller from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBuffer {
    data: Vec<f32>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl TensorBuffer {
    pub(crate) fn from_parts(data: Vec<f32>, shape: Vec<usize>, strides: Vec<usize>) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            data,
            shape,
            strides,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of entries along the leading (batch) axis
    pub fn batch_size(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Element at `coordinates`, or `None` if the coordinate is out of range
    pub fn get(&self, coordinates: &[usize]) -> Option<f32> {
        if coordinates.len() != self.shape.len()
            || coordinates.iter().zip(&self.shape).any(|(c, dim)| c >= dim)
        {
            return None;
        }
        let offset = resolve_offset(&self.strides, coordinates, 0).ok()?;
        self.data.get(offset).copied()
    }

    /// Contiguous data of batch entry `index`
    pub fn image(&self, index: usize) -> Option<&[f32]> {
        let (&batch, &per_image) = (self.shape.first()?, self.strides.first()?);
        if index >= batch {
            return None;
        }
        let start = index * per_image;
        self.data.get(start..start + per_image)
    }

    /// Wrap as a dynamic-rank ndarray without copying
    pub fn into_array(self) -> Result<ArrayD<f32>> {
        Ok(ArrayD::from_shape_vec(IxDyn(&self.shape), self.data)?)
    }

    /// Wrap as an NCHW ndarray without copying
    pub fn into_array4(self) -> Result<Array4<f32>> {
        let [batch, channels, height, width] = <[usize; 4]>::try_from(self.shape.as_slice())
            .map_err(|_| TensorError::InvalidShape {
                shape: self.shape.clone(),
                reason: "expected rank 4".to_string(),
            })?;
        Ok(Array4::from_shape_vec(
            (batch, channels, height, width),
            self.data,
        )?)
    }
}
