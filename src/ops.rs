//! Transformation Implementations
//!
//! Pure typed operators over [`PixelBuffer`] values plus the parameter
//! structs they are invoked with. The registry adapts a caller's
//! free-form argument map into these structs before dispatch; by the
//! time an operator runs, its arguments are well-typed.

use image::imageops::{self, FilterType};
use image::GrayImage;
use serde::Deserialize;

use crate::buffer::PixelBuffer;

fn default_kernel_size() -> u32 {
    5
}
fn default_degree() -> u32 {
    1
}

/// `resize` parameters: target dimensions in pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

impl ResizeParams {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be at least 1".to_string());
        }
        Ok(())
    }
}

/// `dx`/`dy` parameters: gradient aperture and derivative order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivativeParams {
    #[serde(default = "default_kernel_size")]
    pub kernel_size: u32,
    #[serde(default = "default_degree")]
    pub degree: u32,
}

impl DerivativeParams {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !matches!(self.kernel_size, 3 | 5 | 7) {
            return Err(format!(
                "kernel_size must be one of 3, 5, 7 (got {})",
                self.kernel_size
            ));
        }
        if self.degree == 0 || self.degree >= self.kernel_size {
            return Err(format!(
                "degree must be between 1 and kernel_size - 1 (got {})",
                self.degree
            ));
        }
        Ok(())
    }
}

/// Two-threshold parameters shared by `canny_edges`, `binary` and
/// `binary_inverted`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdParams {
    pub first_threshold: f64,
    pub second_threshold: f64,
}

/// Gradient axis for [`derivative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Reduce a color buffer to one channel via the crate's fixed luma
/// weighting. Identity on an already-gray buffer.
pub fn gray(buffer: &PixelBuffer) -> PixelBuffer {
    match buffer {
        PixelBuffer::Gray(img) => PixelBuffer::Gray(img.clone()),
        PixelBuffer::Rgb(img) => PixelBuffer::Gray(imageops::grayscale(img)),
    }
}

/// Bilinear resample to the target dimensions. Channel count is
/// unchanged; the filter is deterministic for identical inputs.
pub fn resize(buffer: &PixelBuffer, params: &ResizeParams) -> PixelBuffer {
    match buffer {
        PixelBuffer::Gray(img) => PixelBuffer::Gray(imageops::resize(
            img,
            params.width,
            params.height,
            FilterType::Triangle,
        )),
        PixelBuffer::Rgb(img) => PixelBuffer::Rgb(imageops::resize(
            img,
            params.width,
            params.height,
            FilterType::Triangle,
        )),
    }
}

/// Gradient magnitude along one axis: a separable Sobel-family filter
/// of the given aperture, applied per channel, with the absolute value
/// of the signed response saturated back into u8 range.
pub fn derivative(buffer: &PixelBuffer, axis: Axis, params: &DerivativeParams) -> PixelBuffer {
    let ksize = params.kernel_size as usize;
    let deriv = deriv_kernel(ksize, params.degree as usize);
    let smooth = deriv_kernel(ksize, 0);
    let (row_kernel, col_kernel) = match axis {
        Axis::Horizontal => (&deriv, &smooth),
        Axis::Vertical => (&smooth, &deriv),
    };

    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let channels = buffer.channels() as usize;
    let src = buffer.samples();
    let radius = (ksize / 2) as isize;

    // Horizontal pass, accumulated in i32 so signed responses survive.
    let mut mid = vec![0i32; width * height * channels];
    for y in 0..height {
        for x in 0..width {
            for ch in 0..channels {
                let mut acc = 0i32;
                for (i, &k) in row_kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + i as isize - radius, width);
                    acc += k * i32::from(src[(y * width + sx) * channels + ch]);
                }
                mid[(y * width + x) * channels + ch] = acc;
            }
        }
    }

    // Vertical pass, then |response| saturated to the sample range.
    let mut out = vec![0u8; width * height * channels];
    for y in 0..height {
        for x in 0..width {
            for ch in 0..channels {
                let mut acc = 0i32;
                for (i, &k) in col_kernel.iter().enumerate() {
                    let sy = reflect_101(y as isize + i as isize - radius, height);
                    acc += k * mid[(sy * width + x) * channels + ch];
                }
                out[(y * width + x) * channels + ch] = acc.unsigned_abs().min(255) as u8;
            }
        }
    }

    PixelBuffer::from_samples(
        buffer.width(),
        buffer.height(),
        buffer.channels(),
        out,
    )
}

/// Binary edge map via two-threshold hysteresis over gradient
/// magnitude. Color input is luma-reduced first.
pub fn canny_edges(buffer: &PixelBuffer, params: &ThresholdParams) -> PixelBuffer {
    let gray: GrayImage = match buffer {
        PixelBuffer::Gray(img) => img.clone(),
        PixelBuffer::Rgb(img) => imageops::grayscale(img),
    };
    let low = params.first_threshold.min(params.second_threshold).max(0.0) as f32;
    let high = params.first_threshold.max(params.second_threshold).max(0.0) as f32;
    PixelBuffer::Gray(imageproc::edges::canny(&gray, low, high))
}

/// Elementwise threshold: sample > first_threshold maps to the
/// saturated second threshold (or 0 when `invert`), everything else to
/// the opposite value.
pub fn threshold(buffer: &PixelBuffer, params: &ThresholdParams, invert: bool) -> PixelBuffer {
    let cutoff = params.first_threshold;
    let set = params.second_threshold.clamp(0.0, 255.0).round() as u8;
    let (above, below) = if invert { (0, set) } else { (set, 0) };
    let out = buffer
        .samples()
        .iter()
        .map(|&s| if f64::from(s) > cutoff { above } else { below })
        .collect();
    PixelBuffer::from_samples(buffer.width(), buffer.height(), buffer.channels(), out)
}

/// Full discrete convolution of two 1-D integer kernels.
fn convolve(a: &[i32], b: &[i32]) -> Vec<i32> {
    let mut out = vec![0i32; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Separable gradient kernel of length `ksize`: a binomial smoothing
/// row convolved with [-1, 1] once per derivative order. ksize 3 /
/// order 1 gives [-1, 0, 1]; order 0 gives the plain smoothing row.
fn deriv_kernel(ksize: usize, order: usize) -> Vec<i32> {
    let mut kernel = vec![1i32];
    for _ in 0..ksize.saturating_sub(order + 1) {
        kernel = convolve(&kernel, &[1, 1]);
    }
    for _ in 0..order {
        kernel = convolve(&kernel, &[-1, 1]);
    }
    kernel
}

/// Reflect an out-of-range index back into [0, len) without repeating
/// the border sample (reflect-101).
fn reflect_101(index: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut i = ((index % period) + period) % period;
    if i >= len as isize {
        i = period - i;
    }
    i as usize
}
