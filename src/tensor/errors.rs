// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for tensor layout and image packing
//!
//! Every failure is detected before or during the single packing pass and
//! reported immediately. Errors fall into three groups:
//! - Shape mismatches (image size, batch size, target shape)
//! - Invalid normalization (channel count, mean/stddev values)
//! - Precondition violations in the indexing primitives

use thiserror::Error;

/// Result alias used throughout the tensor module
pub type Result<T> = std::result::Result<T, TensorError>;

/// Coarse classification of a [`TensorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Inputs disagree with the declared target shape
    ShapeMismatch,
    /// Mean/stddev parameters cannot be applied
    InvalidNormalization,
    /// A layout primitive was called with arguments outside its contract
    PreconditionViolation,
}

/// Errors that can occur while computing layouts or packing images
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// An image in the batch does not match the target height/width
    #[error(
        "Image {index} is {actual_width}x{actual_height}, target shape expects {expected_width}x{expected_height}"
    )]
    ImageSizeMismatch {
        index: usize,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// Batch dimension of the target shape disagrees with the image count
    #[error("Batch size mismatch: target shape declares {expected}, got {actual} images")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// No images were supplied
    #[error("Cannot pack an empty batch")]
    EmptyBatch,

    /// Target shape is not of the form [batch, channels, height, width]
    #[error("Invalid target shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    /// A pixel source returned a row of the wrong length
    #[error("Malformed pixels in image {index}: row {row} has {actual} bytes, expected {expected}")]
    MalformedPixels {
        index: usize,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Raw pixel data does not cover width * height * 3 bytes
    #[error("Pixel data length mismatch: expected {expected} bytes, got {actual}")]
    PixelDataLength { expected: usize, actual: usize },

    /// Wrapping the flat buffer as an ndarray failed
    #[error("Failed to wrap tensor buffer: {0}")]
    ArrayShape(String),

    /// Channel count differs between normalization, target shape and RGB input
    #[error("Channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    /// Standard deviation is zero, negative or not finite
    #[error("Standard deviation for channel {channel} must be finite and > 0, got {value}")]
    InvalidStddev { channel: usize, value: f32 },

    /// Mean is not finite
    #[error("Mean for channel {channel} must be finite, got {value}")]
    InvalidMean { channel: usize, value: f32 },

    /// Strides and coordinates have different lengths
    #[error("Rank mismatch: {strides} strides but {coordinates} coordinates")]
    RankMismatch { strides: usize, coordinates: usize },

    /// Start dimension lies past the last dimension
    #[error("Start dimension {start} out of range for rank {rank}")]
    StartDimensionOutOfRange { start: usize, rank: usize },

    /// A dimension of the shape is zero
    #[error("Dimension {axis} has invalid size {size}")]
    InvalidDimension { axis: usize, size: usize },

    /// Element count of the shape does not fit in usize
    #[error("Element count of shape {shape:?} overflows usize")]
    ShapeOverflow { shape: Vec<usize> },

    /// Offset arithmetic overflowed usize
    #[error("Offset computation overflowed usize")]
    OffsetOverflow,

    /// Flat offset lies past the end of the layout
    #[error("Offset {offset} out of bounds for {len} elements")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Requested batch size for splitting is zero
    #[error("Batch size must be greater than 0")]
    InvalidBatchSize,
}

impl From<ndarray::ShapeError> for TensorError {
    fn from(err: ndarray::ShapeError) -> Self {
        TensorError::ArrayShape(err.to_string())
    }
}

impl TensorError {
    /// Which of the three error groups this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::ImageSizeMismatch { .. }
            | TensorError::BatchSizeMismatch { .. }
            | TensorError::EmptyBatch
            | TensorError::InvalidShape { .. }
            | TensorError::MalformedPixels { .. }
            | TensorError::PixelDataLength { .. }
            | TensorError::ArrayShape(_) => ErrorKind::ShapeMismatch,
            TensorError::ChannelCountMismatch { .. }
            | TensorError::InvalidStddev { .. }
            | TensorError::InvalidMean { .. } => ErrorKind::InvalidNormalization,
            TensorError::RankMismatch { .. }
            | TensorError::StartDimensionOutOfRange { .. }
            | TensorError::InvalidDimension { .. }
            | TensorError::ShapeOverflow { .. }
            | TensorError::OffsetOverflow
            | TensorError::OffsetOutOfBounds { .. }
            | TensorError::InvalidBatchSize => ErrorKind::PreconditionViolation,
        }
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            TensorError::ImageSizeMismatch { .. } => "IMAGE_SIZE_MISMATCH",
            TensorError::BatchSizeMismatch { .. } => "BATCH_SIZE_MISMATCH",
            TensorError::EmptyBatch => "EMPTY_BATCH",
            TensorError::InvalidShape { .. } => "INVALID_SHAPE",
            TensorError::MalformedPixels { .. } => "MALFORMED_PIXELS",
            TensorError::PixelDataLength { .. } => "PIXEL_DATA_LENGTH",
            TensorError::ArrayShape(_) => "ARRAY_SHAPE",
            TensorError::ChannelCountMismatch { .. } => "CHANNEL_COUNT_MISMATCH",
            TensorError::InvalidStddev { .. } => "INVALID_STDDEV",
            TensorError::InvalidMean { .. } => "INVALID_MEAN",
            TensorError::RankMismatch { .. } => "RANK_MISMATCH",
            TensorError::StartDimensionOutOfRange { .. } => "START_DIMENSION_OUT_OF_RANGE",
            TensorError::InvalidDimension { .. } => "INVALID_DIMENSION",
            TensorError::ShapeOverflow { .. } => "SHAPE_OVERFLOW",
            TensorError::OffsetOverflow => "OFFSET_OVERFLOW",
            TensorError::OffsetOutOfBounds { .. } => "OFFSET_OUT_OF_BOUNDS",
            TensorError::InvalidBatchSize => "INVALID_BATCH_SIZE",
        }
    }

    /// Packing is deterministic, so retrying with the same input cannot succeed
    pub fn is_retryable(&self) -> bool {
        false
    }
}
