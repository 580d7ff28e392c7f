// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-channel normalization parameters

use super::errors::{Result, TensorError};
use super::pixels::RGB_CHANNELS;

/// Mean values for normalization (ImageNet)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Per-channel mean and standard deviation
///
/// Values are applied as `(raw / 255 - mean[c]) / stddev[c]`. Construction
/// validates the parameters, so an instance never produces NaN or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationParams {
    mean: Vec<f32>,
    stddev: Vec<f32>,
}

impl NormalizationParams {
    /// Create validated normalization parameters
    ///
    /// # Errors
    /// - `ChannelCountMismatch` if `mean` and `stddev` differ in length or are empty
    /// - `InvalidMean` if a mean is not finite
    /// - `InvalidStddev` if a stddev is not finite, not strictly positive, or
    ///   so small that scaling by it overflows
    /// - `InvalidMean` if a mean pushes the output range of its channel past `f32`
    pub fn new(mean: Vec<f32>, stddev: Vec<f32>) -> Result<Self> {
        if mean.is_empty() || mean.len() != stddev.len() {
            return Err(TensorError::ChannelCountMismatch {
                expected: mean.len(),
                actual: stddev.len(),
            });
        }

        if let Some((channel, &value)) = mean.iter().enumerate().find(|(_, m)| !m.is_finite()) {
            return Err(TensorError::InvalidMean { channel, value });
        }

        if let Some((channel, &value)) = stddev
            .iter()
            .enumerate()
            .find(|(_, s)| {
                !(s.is_finite() && **s > 0.0 && normalize_component(u8::MAX, 0.0, **s).is_finite())
            })
        {
            return Err(TensorError::InvalidStddev { channel, value });
        }

        // Linear in raw, so finite at both ends means finite for every byte
        if let Some(channel) = (0..mean.len()).find(|&c| {
            [0, u8::MAX]
                .iter()
                .any(|&raw| !normalize_component(raw, mean[c], stddev[c]).is_finite())
        }) {
            return Err(TensorError::InvalidMean {
                channel,
                value: mean[channel],
            });
        }

        Ok(Self { mean, stddev })
    }

    /// ImageNet statistics, the default for torchvision-style classifiers
    pub fn imagenet() -> Self {
        Self {
            mean: IMAGENET_MEAN.to_vec(),
            stddev: IMAGENET_STD.to_vec(),
        }
    }

    /// Plain `raw / 255` scaling for `channels` channels
    pub fn identity(channels: usize) -> Self {
        Self {
            mean: vec![0.0; channels],
            stddev: vec![1.0; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn stddev(&self) -> &[f32] {
        &self.stddev
    }

    /// Normalize one raw 8-bit component of `channel`
    ///
    /// Returns `None` if the channel does not exist.
    pub fn normalize(&self, channel: usize, raw: u8) -> Option<f32> {
        let mean = self.mean.get(channel)?;
        let stddev = self.stddev.get(channel)?;
        Some(normalize_component(raw, *mean, *stddev))
    }

    /// Fixed-size view for the three RGB planes
    pub(crate) fn rgb(&self) -> Result<RgbNormalization> {
        if self.channels() != RGB_CHANNELS {
            return Err(TensorError::ChannelCountMismatch {
                expected: RGB_CHANNELS,
                actual: self.channels(),
            });
        }
        Ok(RgbNormalization {
            mean: [self.mean[0], self.mean[1], self.mean[2]],
            stddev: [self.stddev[0], self.stddev[1], self.stddev[2]],
        })
    }
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// Copyable RGB parameters handed to each packing worker
#[derive(Debug, Clone, Copy)]
pub(crate) struct RgbNormalization {
    pub(crate) mean: [f32; 3],
    pub(crate) stddev: [f32; 3],
}

impl RgbNormalization {
    #[inline(always)]
    pub(crate) fn apply(&self, channel: usize, raw: u8) -> f32 {
        normalize_component(raw, self.mean[channel], self.stddev[channel])
    }
}

// Operation order is shared with the vectorized kernel so both paths agree bit for bit.
#[inline(always)]
fn normalize_component(raw: u8, mean: f32, stddev: f32) -> f32 {
    (raw as f32 / 255.0 - mean) / stddev
}
