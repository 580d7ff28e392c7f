// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batched RGB to normalized NCHW tensor packing
//!
//! Steps:
//! 1. Validate the target shape, normalization and every image up front
//! 2. Compute row-major strides for `[batch, 3, height, width]`
//! 3. Split the output into one exclusive slice per batch entry
//! 4. Write `(raw / 255 - mean[c]) / stddev[c]` for every pixel and channel

use std::str::FromStr;
use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::buffer::TensorBuffer;
use super::errors::{Result, TensorError};
use super::normalization::{NormalizationParams, RgbNormalization};
use super::pixels::{RgbPixels, RGB_CHANNELS};
use super::strides::{compute_strides, element_count, resolve_offset, StrideOrder};
use crate::config::PackerConfig;
use crate::vision::resize::{fit_batch, ResizeMode};

pub const BATCH_AXIS: usize = 0;
pub const CHANNEL_AXIS: usize = 1;
pub const HEIGHT_AXIS: usize = 2;
pub const WIDTH_AXIS: usize = 3;

/// How per-pixel offsets are computed
///
/// Both strategies write identical values; `Vectorized` is a throughput
/// optimization only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetStrategy {
    /// Multiply-accumulate against the precomputed strides
    Scalar,
    /// Eight pixels per step as a dot product with the stride vector
    Vectorized,
}

impl Default for OffsetStrategy {
    fn default() -> Self {
        if cfg!(feature = "simd") {
            Self::Vectorized
        } else {
            Self::Scalar
        }
    }
}

impl FromStr for OffsetStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "vectorized" | "simd" => Ok(Self::Vectorized),
            other => Err(format!("Unknown offset strategy: {}", other)),
        }
    }
}

/// Per-call packing options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackOptions {
    pub strategy: OffsetStrategy,
    /// Fill batch entries on rayon workers (needs the `parallel` feature)
    pub parallel: bool,
}

/// Pack `images` into one `[batch, 3, height, width]` tensor
///
/// # Arguments
/// * `images` - Same-sized RGB images; batch order follows slice order
/// * `normalization` - Mean/stddev for exactly three channels
/// * `target_shape` - `[images.len(), 3, height, width]`
///
/// # Errors
/// Fails before allocating if the shape, normalization or any image is
/// inconsistent. A returned buffer is always fully written.
pub fn pack<P: RgbPixels>(
    images: &[P],
    normalization: &NormalizationParams,
    target_shape: &[usize],
) -> Result<TensorBuffer> {
    pack_with(images, normalization, target_shape, PackOptions::default())
}

/// [`pack`] with an explicit offset strategy and parallelism
pub fn pack_with<P: RgbPixels>(
    images: &[P],
    normalization: &NormalizationParams,
    target_shape: &[usize],
    options: PackOptions,
) -> Result<TensorBuffer> {
    let started = Instant::now();

    let layout = PackLayout::validate(images, normalization, target_shape).map_err(|e| {
        debug!(code = e.error_code(), "Rejected pack request: {}", e);
        e
    })?;
    let kernel = Kernel::select(options.strategy, &layout.strides);

    let mut data = vec![0.0f32; layout.len];
    fill(images, &layout, &kernel, options.parallel, &mut data)?;

    debug!(
        batch = images.len(),
        shape = ?layout.shape,
        strategy = ?kernel.strategy(),
        parallel = options.parallel,
        elapsed = ?started.elapsed(),
        "Packed image batch"
    );

    Ok(TensorBuffer::from_parts(
        data,
        layout.shape.to_vec(),
        layout.strides.to_vec(),
    ))
}

/// Split `images` into consecutive batches of at most `batch_size` and pack each
pub fn pack_batches<P: RgbPixels>(
    images: &[P],
    normalization: &NormalizationParams,
    height: usize,
    width: usize,
    batch_size: usize,
    options: PackOptions,
) -> Result<Vec<TensorBuffer>> {
    if batch_size == 0 {
        return Err(TensorError::InvalidBatchSize);
    }
    if images.is_empty() {
        return Err(TensorError::EmptyBatch);
    }

    images
        .chunks(batch_size)
        .map(|chunk| {
            pack_with(
                chunk,
                normalization,
                &[chunk.len(), RGB_CHANNELS, height, width],
                options,
            )
        })
        .collect()
}

/// Validated geometry of one packing call
struct PackLayout {
    shape: [usize; 4],
    strides: [usize; 4],
    len: usize,
    norm: RgbNormalization,
}

impl PackLayout {
    fn validate<P: RgbPixels>(
        images: &[P],
        normalization: &NormalizationParams,
        target_shape: &[usize],
    ) -> Result<Self> {
        let shape: [usize; 4] =
            target_shape
                .try_into()
                .map_err(|_| TensorError::InvalidShape {
                    shape: target_shape.to_vec(),
                    reason: "expected [batch, channels, height, width]".to_string(),
                })?;

        if images.is_empty() {
            return Err(TensorError::EmptyBatch);
        }

        let mut strides = [0usize; 4];
        strides.copy_from_slice(&compute_strides(&shape, StrideOrder::RowMajor)?);
        let len = element_count(&shape)?;

        if shape[BATCH_AXIS] != images.len() {
            return Err(TensorError::BatchSizeMismatch {
                expected: shape[BATCH_AXIS],
                actual: images.len(),
            });
        }
        if shape[CHANNEL_AXIS] != RGB_CHANNELS {
            return Err(TensorError::ChannelCountMismatch {
                expected: RGB_CHANNELS,
                actual: shape[CHANNEL_AXIS],
            });
        }
        let norm = normalization.rgb()?;

        let (height, width) = (shape[HEIGHT_AXIS], shape[WIDTH_AXIS]);
        let row_len = width * RGB_CHANNELS;
        for (index, image) in images.iter().enumerate() {
            if image.width() != width || image.height() != height {
                return Err(TensorError::ImageSizeMismatch {
                    index,
                    expected_width: width,
                    expected_height: height,
                    actual_width: image.width(),
                    actual_height: image.height(),
                });
            }
            if let Some((row, actual)) = (0..height)
                .map(|y| (y, image.row(y).len()))
                .find(|&(_, actual)| actual != row_len)
            {
                return Err(TensorError::MalformedPixels {
                    index,
                    row,
                    expected: row_len,
                    actual,
                });
            }
        }

        Ok(Self {
            shape,
            strides,
            len,
            norm,
        })
    }

    /// Elements per batch entry
    fn image_len(&self) -> usize {
        self.strides[BATCH_AXIS]
    }
}

enum Kernel {
    Scalar,
    #[cfg(feature = "simd")]
    Vectorized(super::simd::LaneStrides),
}

impl Kernel {
    fn select(strategy: OffsetStrategy, strides: &[usize; 4]) -> Self {
        match strategy {
            OffsetStrategy::Scalar => Kernel::Scalar,
            OffsetStrategy::Vectorized => {
                #[cfg(feature = "simd")]
                {
                    if let Some(lanes) = super::simd::LaneStrides::new(strides) {
                        return Kernel::Vectorized(lanes);
                    }
                    warn!(
                        image_len = strides[BATCH_AXIS],
                        "Batch entry too large for i32 lanes, using scalar offsets"
                    );
                }
                #[cfg(not(feature = "simd"))]
                {
                    let _ = strides;
                    warn!("Vectorized offsets need the simd feature, using scalar offsets");
                }
                Kernel::Scalar
            }
        }
    }

    fn strategy(&self) -> OffsetStrategy {
        match self {
            Kernel::Scalar => OffsetStrategy::Scalar,
            #[cfg(feature = "simd")]
            Kernel::Vectorized(_) => OffsetStrategy::Vectorized,
        }
    }

    fn fill_image<P: RgbPixels>(
        &self,
        image: &P,
        norm: &RgbNormalization,
        strides: &[usize; 4],
        out: &mut [f32],
    ) -> Result<()> {
        match self {
            Kernel::Scalar => fill_image_scalar(image, norm, strides, out),
            #[cfg(feature = "simd")]
            Kernel::Vectorized(lanes) => {
                super::simd::fill_image(image, norm, strides, lanes, out);
                Ok(())
            }
        }
    }
}

/// Hand each batch entry's slice to exactly one writer
fn fill<P: RgbPixels>(
    images: &[P],
    layout: &PackLayout,
    kernel: &Kernel,
    parallel: bool,
    data: &mut [f32],
) -> Result<()> {
    let image_len = layout.image_len();

    if parallel && images.len() > 1 {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            return data
                .par_chunks_exact_mut(image_len)
                .zip(images.par_iter())
                .try_for_each(|(out, image)| {
                    kernel.fill_image(image, &layout.norm, &layout.strides, out)
                });
        }
        #[cfg(not(feature = "parallel"))]
        debug!("Parallel packing needs the parallel feature, packing sequentially");
    }

    data.chunks_exact_mut(image_len)
        .zip(images)
        .try_for_each(|(out, image)| kernel.fill_image(image, &layout.norm, &layout.strides, out))
}

/// Canonical kernel: offsets by multiply-accumulate against the strides
///
/// Offsets are relative to the batch entry, so resolution starts at the
/// channel axis.
fn fill_image_scalar<P: RgbPixels>(
    image: &P,
    norm: &RgbNormalization,
    strides: &[usize; 4],
    out: &mut [f32],
) -> Result<()> {
    let mut coordinates = [0usize; 4];
    let mut row_bases = [0usize; RGB_CHANNELS];

    for y in 0..image.height() {
        coordinates[HEIGHT_AXIS] = y;
        for (c, base) in row_bases.iter_mut().enumerate() {
            coordinates[CHANNEL_AXIS] = c;
            *base = resolve_offset(strides, &coordinates, CHANNEL_AXIS)?;
        }

        for (x, pixel) in image.row(y).chunks_exact(RGB_CHANNELS).enumerate() {
            let step = x * strides[WIDTH_AXIS];
            for (c, &raw) in pixel.iter().enumerate() {
                out[row_bases[c] + step] = norm.apply(c, raw);
            }
        }
    }

    Ok(())
}

/// Packs images with a fixed normalization and target size
#[derive(Debug, Clone)]
pub struct TensorPacker {
    normalization: NormalizationParams,
    width: u32,
    height: u32,
    resize_mode: ResizeMode,
    options: PackOptions,
}

impl TensorPacker {
    /// Build a packer from validated configuration
    pub fn new(config: &PackerConfig) -> Result<Self> {
        config.validate()?;
        let packer = Self {
            normalization: config.normalization()?,
            width: config.target_width,
            height: config.target_height,
            resize_mode: config.resize_mode,
            options: PackOptions {
                strategy: config.strategy,
                parallel: config.parallel,
            },
        };

        info!(
            width = packer.width,
            height = packer.height,
            strategy = ?packer.options.strategy,
            parallel = packer.options.parallel,
            "Tensor packer ready"
        );
        Ok(packer)
    }

    /// ImageNet normalization at `width` x `height`
    pub fn imagenet(width: u32, height: u32) -> Self {
        Self {
            normalization: NormalizationParams::imagenet(),
            width,
            height,
            resize_mode: ResizeMode::default(),
            options: PackOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PackOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_resize_mode(mut self, resize_mode: ResizeMode) -> Self {
        self.resize_mode = resize_mode;
        self
    }

    pub fn normalization(&self) -> &NormalizationParams {
        &self.normalization
    }

    pub fn options(&self) -> PackOptions {
        self.options
    }

    /// `[batch, 3, height, width]` for this packer
    pub fn target_shape(&self, batch: usize) -> [usize; 4] {
        [
            batch,
            RGB_CHANNELS,
            self.height as usize,
            self.width as usize,
        ]
    }

    /// Pack images that are already at the target size
    pub fn pack_images<P: RgbPixels>(&self, images: &[P]) -> Result<TensorBuffer> {
        pack_with(
            images,
            &self.normalization,
            &self.target_shape(images.len()),
            self.options,
        )
    }

    /// Pack images in consecutive batches of at most `batch_size`
    pub fn pack_batches<P: RgbPixels>(
        &self,
        images: &[P],
        batch_size: usize,
    ) -> Result<Vec<TensorBuffer>> {
        pack_batches(
            images,
            &self.normalization,
            self.height as usize,
            self.width as usize,
            batch_size,
            self.options,
        )
    }

    /// Resize decoded images to the target size, then pack them
    pub fn prepare_and_pack(&self, images: &[DynamicImage]) -> Result<TensorBuffer> {
        let fitted = fit_batch(images, self.width, self.height, self.resize_mode);
        self.pack_images(&fitted)
    }
}
