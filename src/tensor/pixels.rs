// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read-only access to decoded RGB images

use image::{Rgb, RgbImage};

use super::errors::{Result, TensorError};

/// Number of interleaved components per pixel
pub const RGB_CHANNELS: usize = 3;

/// A decoded image seen as rows of interleaved 8-bit R, G, B components
///
/// Implementors must return rows of exactly `width() * 3` bytes; the packer
/// checks this before writing anything.
pub trait RgbPixels: Sync {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Row `y` as `[r, g, b, r, g, b, ...]`
    fn row(&self, y: usize) -> &[u8];
}

impl RgbPixels for RgbImage {
    fn width(&self) -> usize {
        self.dimensions().0 as usize
    }

    fn height(&self) -> usize {
        self.dimensions().1 as usize
    }

    fn row(&self, y: usize) -> &[u8] {
        let row_len = RgbPixels::width(self) * RGB_CHANNELS;
        let start = y * row_len;
        self.as_raw().get(start..start + row_len).unwrap_or(&[])
    }
}

impl<T: RgbPixels> RgbPixels for &T {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn row(&self, y: usize) -> &[u8] {
        (**self).row(y)
    }
}

/// Owned, tightly packed RGB pixel grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved RGB bytes
    ///
    /// # Errors
    /// - `ShapeOverflow` if `width * height * 3` does not fit in `usize`
    /// - `PixelDataLength` if `data` is not exactly `width * height * 3` bytes
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(TensorError::PixelDataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Every pixel set to `rgb`
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    /// Build pixels from a function of `(x, y)`
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height).unwrap_or(0));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * RGB_CHANNELS;
        Some([self.data[start], self.data[start + 1], self.data[start + 2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl RgbPixels for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn row(&self, y: usize) -> &[u8] {
        let row_len = self.width * RGB_CHANNELS;
        let start = y * row_len;
        self.data.get(start..start + row_len).unwrap_or(&[])
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: image.into_raw(),
        }
    }
}

impl TryFrom<&PixelBuffer> for RgbImage {
    type Error = TensorError;

    /// Fails with `InvalidShape` if a side exceeds `u32::MAX`
    fn try_from(buffer: &PixelBuffer) -> Result<Self> {
        let side = |size: usize| {
            u32::try_from(size).map_err(|_| TensorError::InvalidShape {
                shape: vec![buffer.height, buffer.width, RGB_CHANNELS],
                reason: "image sides are limited to u32".to_string(),
            })
        };
        let (width, height) = (side(buffer.width)?, side(buffer.height)?);
        Ok(RgbImage::from_fn(width, height, |x, y| {
            Rgb(buffer.pixel(x as usize, y as usize).unwrap_or([0, 0, 0]))
        }))
    }
}

fn byte_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(RGB_CHANNELS))
        .ok_or_else(|| TensorError::ShapeOverflow {
            shape: vec![height, width, RGB_CHANNELS],
        })
}
