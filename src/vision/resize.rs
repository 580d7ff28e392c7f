// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fit decoded images to a fixed input size before packing

use std::str::FromStr;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Gray used for padding and for images with no pixels
pub const PAD_VALUE: u8 = 128;

/// How an image is brought to the target size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Resize to exact size (may distort aspect ratio)
    Stretch,
    /// Resize keeping aspect ratio with center crop
    #[default]
    CenterCrop,
    /// Resize keeping aspect ratio with padding (letterbox)
    Letterbox,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stretch" => Ok(Self::Stretch),
            "center_crop" | "crop" => Ok(Self::CenterCrop),
            "letterbox" | "pad" => Ok(Self::Letterbox),
            other => Err(format!("Unknown resize mode: {}", other)),
        }
    }
}

/// Resize `image` to exactly `width` x `height` RGB
pub fn fit_to_size(image: &DynamicImage, width: u32, height: u32, mode: ResizeMode) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return RgbImage::from_pixel(width, height, Rgb([PAD_VALUE; 3]));
    }
    if (orig_w, orig_h) == (width, height) {
        return image.to_rgb8();
    }

    match mode {
        ResizeMode::Stretch => image
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgb8(),
        ResizeMode::CenterCrop => center_crop_resize(image, width, height),
        ResizeMode::Letterbox => letterbox_resize(image, width, height),
    }
}

/// [`fit_to_size`] over a whole batch, preserving order
pub fn fit_batch(images: &[DynamicImage], width: u32, height: u32, mode: ResizeMode) -> Vec<RgbImage> {
    images
        .iter()
        .map(|image| fit_to_size(image, width, height, mode))
        .collect()
}

/// Cover the target, then cut the overhang evenly from both sides
fn center_crop_resize(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    let scale_w = width as f32 / orig_w as f32;
    let scale_h = height as f32 / orig_h as f32;
    let scale = scale_w.max(scale_h);

    // Rounding must never leave the covered area smaller than the target
    let new_w = ((orig_w as f32 * scale).round() as u32).max(width);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(height);

    let resized = image.resize_exact(new_w, new_h, FilterType::Lanczos3);

    let crop_x = (new_w - width) / 2;
    let crop_y = (new_h - height) / 2;

    resized.crop_imm(crop_x, crop_y, width, height).to_rgb8()
}

/// Fit inside the target and center on a gray canvas
fn letterbox_resize(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    let scale_w = width as f32 / orig_w as f32;
    let scale_h = height as f32 / orig_h as f32;
    let scale = scale_w.min(scale_h);

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, width);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, height);

    let rgb = image
        .resize_exact(new_w, new_h, FilterType::Lanczos3)
        .to_rgb8();

    let mut output = RgbImage::from_pixel(width, height, Rgb([PAD_VALUE; 3]));

    let offset_x = (width - new_w) / 2;
    let offset_y = (height - new_h) / 2;

    for (x, y, pixel) in rgb.enumerate_pixels() {
        output.put_pixel(x + offset_x, y + offset_y, *pixel);
    }

    output
}
