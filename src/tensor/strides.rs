// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stride computation and offset resolution for dense N-dimensional layouts

use serde::{Deserialize, Serialize};

use super::errors::{Result, TensorError};

/// Axis ordering of a dense layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrideOrder {
    /// Last dimension is contiguous ("C" layout)
    #[default]
    RowMajor,
    /// First dimension is contiguous ("F" layout)
    ColumnMajor,
}

/// Compute the stride of every dimension of `shape`
///
/// Row-major gives the last dimension stride 1 and accumulates toward the
/// first; column-major does the reverse. An empty shape yields empty strides.
///
/// # Errors
/// - `InvalidDimension` if any dimension is zero
/// - `ShapeOverflow` if the element count does not fit in `usize`
pub fn compute_strides(shape: &[usize], order: StrideOrder) -> Result<Vec<usize>> {
    check_dimensions(shape)?;

    let mut strides = vec![0; shape.len()];
    let mut stride: usize = 1;
    let mut place = |axis: usize| -> Result<()> {
        strides[axis] = stride;
        stride = stride
            .checked_mul(shape[axis])
            .ok_or_else(|| TensorError::ShapeOverflow {
                shape: shape.to_vec(),
            })?;
        Ok(())
    };

    match order {
        StrideOrder::RowMajor => (0..shape.len()).rev().try_for_each(&mut place)?,
        StrideOrder::ColumnMajor => (0..shape.len()).try_for_each(&mut place)?,
    }

    Ok(strides)
}

/// Resolve a coordinate to a flat offset
///
/// Sums `strides[d] * coordinates[d]` for every `d >= start_dimension`.
/// Starting past dimension 0 gives the offset inside one slice of the
/// leading axes, e.g. `start_dimension = 1` is the offset within a batch entry.
///
/// # Errors
/// - `RankMismatch` if the slices have different lengths
/// - `StartDimensionOutOfRange` if `start_dimension` exceeds the rank
/// - `OffsetOverflow` if the sum does not fit in `usize`
pub fn resolve_offset(
    strides: &[usize],
    coordinates: &[usize],
    start_dimension: usize,
) -> Result<usize> {
    if strides.len() != coordinates.len() {
        return Err(TensorError::RankMismatch {
            strides: strides.len(),
            coordinates: coordinates.len(),
        });
    }
    if start_dimension > strides.len() {
        return Err(TensorError::StartDimensionOutOfRange {
            start: start_dimension,
            rank: strides.len(),
        });
    }

    strides[start_dimension..]
        .iter()
        .zip(&coordinates[start_dimension..])
        .try_fold(0usize, |offset, (&stride, &coordinate)| {
            stride
                .checked_mul(coordinate)
                .and_then(|term| offset.checked_add(term))
        })
        .ok_or(TensorError::OffsetOverflow)
}

/// Number of elements in a dense tensor of `shape` (1 for rank 0)
pub fn element_count(shape: &[usize]) -> Result<usize> {
    check_dimensions(shape)?;
    shape
        .iter()
        .try_fold(1usize, |count, &dim| count.checked_mul(dim))
        .ok_or_else(|| TensorError::ShapeOverflow {
            shape: shape.to_vec(),
        })
}

/// Inverse of [`resolve_offset`] for a dense layout of `shape`
pub fn unravel_offset(offset: usize, shape: &[usize], order: StrideOrder) -> Result<Vec<usize>> {
    let strides = compute_strides(shape, order)?;
    let len = element_count(shape)?;
    if offset >= len {
        return Err(TensorError::OffsetOutOfBounds { offset, len });
    }

    let mut coordinates = vec![0; shape.len()];
    let mut remainder = offset;
    let mut take = |axis: usize| {
        coordinates[axis] = remainder / strides[axis];
        remainder %= strides[axis];
    };
    // Largest stride first
    match order {
        StrideOrder::RowMajor => (0..shape.len()).for_each(&mut take),
        StrideOrder::ColumnMajor => (0..shape.len()).rev().for_each(&mut take),
    }

    Ok(coordinates)
}

fn check_dimensions(shape: &[usize]) -> Result<()> {
    match shape.iter().position(|&dim| dim == 0) {
        Some(axis) => Err(TensorError::InvalidDimension { axis, size: 0 }),
        None => Ok(()),
    }
}
