//! Resampling kernels for moving images between pixel lattices.
//!
//! The interpolation policy is always passed explicitly. Sample positions use
//! pixel-centre alignment, so an integer-factor nearest-neighbour upsample
//! replicates each source pixel into an exact `factor x factor` block.
use crate::image::{data::ImageSize, errors::ImageError};
use ndarray::{Array2, ArrayView2};
use std::str::FromStr;

/// Interpolation policy for [`resize_channel`].
///
/// - `Nearest`: copy the nearest source pixel; never blends values.
/// - `Linear`: bilinear blend of the four surrounding source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Nearest,
    Linear,
}

impl FromStr for InterpolationMode {
    type Err = ImageError;

    /// Accepts `"nearest"` and `"linear"` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(InterpolationMode::Nearest),
            "linear" => Ok(InterpolationMode::Linear),
            _ => Err(ImageError::UnknownInterpolation { name: s.to_string() }),
        }
    }
}

/// Resample a single channel plane onto `target`.
///
/// `target` must be non-empty; [`ImageData::resized`](crate::image::ImageData::resized)
/// checks this before calling in.
pub fn resize_channel(
    src: ArrayView2<'_, f64>, target: ImageSize, mode: InterpolationMode,
) -> Array2<f64> {
    match mode {
        InterpolationMode::Nearest => resize_nearest(src, target),
        InterpolationMode::Linear => resize_linear(src, target),
    }
}

fn resize_nearest(src: ArrayView2<'_, f64>, target: ImageSize) -> Array2<f64> {
    let (src_h, src_w) = src.dim();
    Array2::from_shape_fn((target.height, target.width), |(y, x)| {
        let sy = ((y * src_h) / target.height).min(src_h - 1);
        let sx = ((x * src_w) / target.width).min(src_w - 1);
        src[(sy, sx)]
    })
}

fn resize_linear(src: ArrayView2<'_, f64>, target: ImageSize) -> Array2<f64> {
    let (src_h, src_w) = src.dim();
    let scale_y = src_h as f64 / target.height as f64;
    let scale_x = src_w as f64 / target.width as f64;
    Array2::from_shape_fn((target.height, target.width), |(y, x)| {
        let (y0, y1, ty) = sample_position(y, scale_y, src_h);
        let (x0, x1, tx) = sample_position(x, scale_x, src_w);
        let top = src[(y0, x0)] * (1.0 - tx) + src[(y0, x1)] * tx;
        let bottom = src[(y1, x0)] * (1.0 - tx) + src[(y1, x1)] * tx;
        top * (1.0 - ty) + bottom * ty
    })
}

/// Map a destination index to its two source neighbours and blend weight.
fn sample_position(dst: usize, scale: f64, len: usize) -> (usize, usize, f64) {
    let max = (len - 1) as f64;
    let pos = ((dst as f64 + 0.5) * scale - 0.5).clamp(0.0, max);
    let lo = pos.floor();
    let i0 = lo as usize;
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, pos - lo)
}
