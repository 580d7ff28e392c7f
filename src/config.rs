// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for tensor packing

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tensor::normalization::{NormalizationParams, IMAGENET_MEAN, IMAGENET_STD};
use crate::tensor::packer::{OffsetStrategy, HEIGHT_AXIS, WIDTH_AXIS};
use crate::tensor::TensorError;
use crate::vision::ResizeMode;

/// Default model input edge, as used by ImageNet classifiers
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Configuration for a [`TensorPacker`](crate::tensor::TensorPacker)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Model input width in pixels
    pub target_width: u32,
    /// Model input height in pixels
    pub target_height: u32,
    /// Per-channel mean, in R, G, B order
    pub mean: Vec<f32>,
    /// Per-channel standard deviation, in R, G, B order
    pub stddev: Vec<f32>,
    /// Offset computation used while packing
    pub strategy: OffsetStrategy,
    /// Fill batch entries concurrently
    pub parallel: bool,
    /// How decoded images are brought to the target size
    pub resize_mode: ResizeMode,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_INPUT_SIZE,
            target_height: DEFAULT_INPUT_SIZE,
            mean: IMAGENET_MEAN.to_vec(),
            stddev: IMAGENET_STD.to_vec(),
            strategy: OffsetStrategy::default(),
            parallel: false,
            resize_mode: ResizeMode::default(),
        }
    }
}

/// Layout of a TOML file carrying a `[tensor]` table
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tensor: PackerConfig,
}

impl PackerConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// also keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            target_width: env_parse("TENSOR_TARGET_WIDTH").unwrap_or(defaults.target_width),
            target_height: env_parse("TENSOR_TARGET_HEIGHT").unwrap_or(defaults.target_height),
            mean: env_channels("TENSOR_NORM_MEAN").unwrap_or(defaults.mean),
            stddev: env_channels("TENSOR_NORM_STD").unwrap_or(defaults.stddev),
            strategy: env_parse("TENSOR_OFFSET_STRATEGY").unwrap_or(defaults.strategy),
            parallel: env::var("TENSOR_PARALLEL")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.parallel),
            resize_mode: env_parse("TENSOR_RESIZE_MODE").unwrap_or(defaults.resize_mode),
        }
    }

    /// Parse the `[tensor]` table of a TOML document
    ///
    /// Missing keys keep their defaults. The result is validated.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).context("Failed to parse tensor configuration")?;
        file.tensor
            .validate()
            .context("Invalid tensor configuration")?;
        Ok(file.tensor)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), TensorError> {
        if self.target_height == 0 {
            return Err(TensorError::InvalidDimension {
                axis: HEIGHT_AXIS,
                size: 0,
            });
        }
        if self.target_width == 0 {
            return Err(TensorError::InvalidDimension {
                axis: WIDTH_AXIS,
                size: 0,
            });
        }
        self.normalization()?.rgb()?;
        Ok(())
    }

    /// Normalization parameters described by `mean` and `stddev`
    pub fn normalization(&self) -> std::result::Result<NormalizationParams, TensorError> {
        NormalizationParams::new(self.mean.clone(), self.stddev.clone())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    let parsed = value.parse().ok();
    if parsed.is_none() {
        warn!("Ignoring unparsable {}={:?}", key, value);
    }
    parsed
}

fn env_channels(key: &str) -> Option<Vec<f32>> {
    let value = env::var(key).ok()?;
    let parsed = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok();
    if parsed.is_none() {
        warn!("Ignoring unparsable {}={:?}", key, value);
    }
    parsed
}
