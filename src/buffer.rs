//! Pixel Buffer - Raster Value Type
//!
//! Dense 8-bit raster with an explicit channel layout: 1 channel
//! (grayscale) or 3 channels (color). Transformations never mutate a
//! buffer in place; each step produces a fresh one.

use std::fmt;

use image::{DynamicImage, GrayImage, RgbImage};

/// An in-memory raster: width x height grid of u8 channel samples.
#[derive(Clone, PartialEq)]
pub enum PixelBuffer {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        match self {
            PixelBuffer::Gray(img) => img.width(),
            PixelBuffer::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            PixelBuffer::Gray(img) => img.height(),
            PixelBuffer::Rgb(img) => img.height(),
        }
    }

    /// Number of samples per pixel: 1 for grayscale, 3 for color.
    pub fn channels(&self) -> u8 {
        match self {
            PixelBuffer::Gray(_) => 1,
            PixelBuffer::Rgb(_) => 3,
        }
    }

    /// Raw samples in row-major order, channels interleaved.
    pub fn samples(&self) -> &[u8] {
        match self {
            PixelBuffer::Gray(img) => img.as_raw(),
            PixelBuffer::Rgb(img) => img.as_raw(),
        }
    }

    /// Rasterize a decoded container image. Luma sources stay
    /// single-channel; everything else (including alpha layouts)
    /// becomes 3-channel color.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(img) => PixelBuffer::Gray(img),
            DynamicImage::ImageLumaA8(img) => {
                PixelBuffer::Gray(DynamicImage::ImageLumaA8(img).to_luma8())
            }
            other => PixelBuffer::Rgb(other.to_rgb8()),
        }
    }

    /// Expand to a 3-channel color image, replicating the single
    /// channel when the buffer is grayscale.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            PixelBuffer::Gray(img) => DynamicImage::ImageLuma8(img.clone()).to_rgb8(),
            PixelBuffer::Rgb(img) => img.clone(),
        }
    }

    /// Rebuild a buffer from raw samples with the given layout.
    ///
    /// Internal constructor: callers guarantee `samples.len() ==
    /// width * height * channels` and `channels` in {1, 3}.
    pub(crate) fn from_samples(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Self {
        match channels {
            1 => PixelBuffer::Gray(
                GrayImage::from_raw(width, height, samples)
                    .expect("gray sample count matches dimensions"),
            ),
            3 => PixelBuffer::Rgb(
                RgbImage::from_raw(width, height, samples)
                    .expect("rgb sample count matches dimensions"),
            ),
            _ => unreachable!("channel count is 1 or 3"),
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channels", &self.channels())
            .finish()
    }
}
