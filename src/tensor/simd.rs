// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Eight-lane packing kernel
//!
//! Offsets for eight neighbouring pixels are computed at once as the dot
//! product of their `(channel, y, x)` coordinate vectors with the stride
//! vector, and the normalization runs on `f32x8` with the same operation
//! order as the scalar path, so both kernels write identical bits.

use wide::{f32x8, i32x8};

use super::normalization::RgbNormalization;
use super::packer::{CHANNEL_AXIS, HEIGHT_AXIS, WIDTH_AXIS};
use super::pixels::{RgbPixels, RGB_CHANNELS};

pub(crate) const LANES: usize = 8;

const LANE_INDEX: [i32; LANES] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Channel/height/width strides broadcast across all lanes
pub(crate) struct LaneStrides {
    channel: i32x8,
    height: i32x8,
    width: i32x8,
}

impl LaneStrides {
    /// `None` if offsets inside one batch entry would not fit an i32 lane
    pub(crate) fn new(strides: &[usize; 4]) -> Option<Self> {
        // strides[0] bounds every offset inside one batch entry
        i32::try_from(strides[0]).ok()?;
        Some(Self {
            channel: i32x8::splat(strides[CHANNEL_AXIS] as i32),
            height: i32x8::splat(strides[HEIGHT_AXIS] as i32),
            width: i32x8::splat(strides[WIDTH_AXIS] as i32),
        })
    }

    /// Offsets of `(channel, y, x0 + lane)` for each of the eight lanes
    #[inline(always)]
    pub(crate) fn offsets(&self, channel: i32, y: i32, x0: i32) -> i32x8 {
        let xs = i32x8::splat(x0) + i32x8::from(LANE_INDEX);
        i32x8::splat(channel) * self.channel + i32x8::splat(y) * self.height + xs * self.width
    }
}

/// Fill one batch entry; `out` is that entry's slice of the tensor
pub(crate) fn fill_image<P: RgbPixels>(
    image: &P,
    norm: &RgbNormalization,
    strides: &[usize; 4],
    lanes: &LaneStrides,
    out: &mut [f32],
) {
    let width = image.width();
    let scale = f32x8::splat(255.0);
    let mean = norm.mean.map(f32x8::splat);
    let stddev = norm.stddev.map(f32x8::splat);

    for y in 0..image.height() {
        let row = image.row(y);
        let mut x = 0;

        while x + LANES <= width {
            let pixels = &row[x * RGB_CHANNELS..(x + LANES) * RGB_CHANNELS];
            for c in 0..RGB_CHANNELS {
                let raw: [f32; LANES] =
                    std::array::from_fn(|lane| pixels[lane * RGB_CHANNELS + c] as f32);
                let values = (f32x8::from(raw) / scale - mean[c]) / stddev[c];
                let offsets = lanes.offsets(c as i32, y as i32, x as i32);
                for (offset, value) in offsets.to_array().into_iter().zip(values.to_array()) {
                    out[offset as usize] = value;
                }
            }
            x += LANES;
        }

        // Tail narrower than one vector
        let row_base = y * strides[HEIGHT_AXIS];
        for (x, pixel) in row.chunks_exact(RGB_CHANNELS).enumerate().skip(x) {
            let base = row_base + x * strides[WIDTH_AXIS];
            for (c, &raw) in pixel.iter().enumerate() {
                out[base + c * strides[CHANNEL_AXIS]] = norm.apply(c, raw);
            }
        }
    }
}
