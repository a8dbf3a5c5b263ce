//! Image containers shared by observations, estimates, and regularizers.
//!
//! Purpose
//! -------
//! Provide a small, validated multi-channel image type that doubles as the
//! bridge between pixel grids and the flat parameter vectors handed to the
//! minimizer. Every image in the crate (LR frames, HR observations, HR
//! estimates, model outputs, regularizer gradients) is an [`ImageData`].
//!
//! Key behaviors
//! -------------
//! - [`ImageSize`] describes a pixel lattice and offers checked arithmetic
//!   for area and integer scaling.
//! - [`ImageData`] stores pixels as an `ndarray::Array3<f64>` indexed
//!   `(channel, row, col)` and rejects empty shapes at construction.
//! - Conversion to and from a flat vector is channel-major: channel `c`
//!   occupies the contiguous slice `[c * n, (c + 1) * n)` with
//!   `n = width * height`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `num_channels() > 0`, `width > 0`, `height > 0` for every instance.
//! - Pixel values are not range-checked; finiteness is enforced by the
//!   optimizer layer where it matters.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction failures, flat-vector layout, channel
//!   extraction and stacking.
use crate::image::{
    errors::{ImageError, ImageResult},
    resize::{InterpolationMode, resize_channel},
};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};

/// Width/height of a pixel lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// `width * height`, or `None` on `usize` overflow.
    pub fn checked_area(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Number of pixels. Callers must only use this on sizes of images that
    /// actually exist; use [`ImageSize::checked_area`] for derived sizes.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Scale both dimensions by an integer factor, or `None` on overflow.
    pub fn scaled(&self, factor: usize) -> Option<ImageSize> {
        Some(ImageSize {
            width: self.width.checked_mul(factor)?,
            height: self.height.checked_mul(factor)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `ImageData` — a validated multi-channel image on a fixed lattice.
///
/// Fields
/// ------
/// - `pixels`: `Array3<f64>` of shape `(channels, height, width)`.
///
/// Invariants
/// ----------
/// - All three axes are non-empty.
///
/// Notes
/// -----
/// - Cloning copies the pixel buffer; observations rely on this to hold
///   independent copies of the caller's frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pixels: Array3<f64>,
}

impl ImageData {
    /// Wrap a `(channels, height, width)` pixel array.
    ///
    /// Errors
    /// ------
    /// - [`ImageError::NoChannels`] if the channel axis is empty.
    /// - [`ImageError::EmptyImage`] if width or height is zero.
    pub fn new(pixels: Array3<f64>) -> ImageResult<Self> {
        let (channels, height, width) = pixels.dim();
        if channels == 0 {
            return Err(ImageError::NoChannels);
        }
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// Build an image from per-channel planes of equal shape.
    ///
    /// Errors
    /// ------
    /// - [`ImageError::NoChannels`] for an empty list.
    /// - [`ImageError::ChannelSizeMismatch`] naming the first plane whose
    ///   shape differs from the first one.
    /// - [`ImageError::EmptyImage`] for zero-sized planes.
    pub fn from_channels(channels: &[Array2<f64>]) -> ImageResult<Self> {
        let first = channels.first().ok_or(ImageError::NoChannels)?;
        let (height, width) = first.dim();
        for (index, plane) in channels.iter().enumerate().skip(1) {
            if plane.dim() != (height, width) {
                return Err(ImageError::ChannelSizeMismatch {
                    index,
                    expected: (width, height),
                    found: (plane.ncols(), plane.nrows()),
                });
            }
        }
        let mut pixels = Array3::zeros((channels.len(), height, width));
        for (mut dst, plane) in pixels.axis_iter_mut(Axis(0)).zip(channels) {
            dst.assign(plane);
        }
        Self::new(pixels)
    }

    /// Image of the given size with every pixel set to `value`.
    pub fn filled(size: ImageSize, num_channels: usize, value: f64) -> ImageResult<Self> {
        Self::new(Array3::from_elem((num_channels, size.height, size.width), value))
    }

    /// All-zero image of the given size.
    pub fn zeros(size: ImageSize, num_channels: usize) -> ImageResult<Self> {
        Self::filled(size, num_channels, 0.0)
    }

    /// Rebuild an image from a channel-major flat vector.
    ///
    /// Errors
    /// ------
    /// - [`ImageError::BufferLengthMismatch`] if
    ///   `theta.len() != size.area() * num_channels`. A product that
    ///   overflows `usize` is reported as `expected == usize::MAX`.
    /// - Any construction error from [`ImageData::new`].
    pub fn from_theta(theta: &Array1<f64>, size: ImageSize, num_channels: usize) -> ImageResult<Self> {
        let expected = size
            .checked_area()
            .and_then(|area| area.checked_mul(num_channels))
            .unwrap_or(usize::MAX);
        if theta.len() != expected {
            return Err(ImageError::BufferLengthMismatch { expected, found: theta.len() });
        }
        let pixels = Array3::from_shape_fn((num_channels, size.height, size.width), |(c, y, x)| {
            theta[(c * size.height + y) * size.width + x]
        });
        Self::new(pixels)
    }

    /// Flatten into a channel-major parameter vector.
    pub fn to_theta(&self) -> Array1<f64> {
        self.pixels.iter().copied().collect()
    }

    pub fn num_channels(&self) -> usize {
        self.pixels.len_of(Axis(0))
    }

    pub fn size(&self) -> ImageSize {
        let (_, height, width) = self.pixels.dim();
        ImageSize { width, height }
    }

    pub fn num_pixels(&self) -> usize {
        self.size().area()
    }

    pub fn pixels(&self) -> &Array3<f64> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Array3<f64> {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Array3<f64> {
        self.pixels
    }

    /// Borrow one channel plane.
    pub fn channel(&self, channel: usize) -> ImageResult<ArrayView2<'_, f64>> {
        self.check_channel(channel)?;
        Ok(self.pixels.index_axis(Axis(0), channel))
    }

    /// Copy one channel out as a single-channel image.
    pub fn channel_image(&self, channel: usize) -> ImageResult<ImageData> {
        self.check_channel(channel)?;
        Ok(Self { pixels: self.pixels.slice(s![channel..channel + 1, .., ..]).to_owned() })
    }

    /// Concatenate images of equal size along the channel axis.
    ///
    /// Errors
    /// ------
    /// - [`ImageError::NoChannels`] for an empty list.
    /// - [`ImageError::ChannelSizeMismatch`] if any image differs in size
    ///   from the first.
    pub fn stack(images: &[ImageData]) -> ImageResult<ImageData> {
        let first = images.first().ok_or(ImageError::NoChannels)?;
        let size = first.size();
        let mut total = 0;
        for (index, image) in images.iter().enumerate() {
            if image.size() != size {
                return Err(ImageError::ChannelSizeMismatch {
                    index,
                    expected: (size.width, size.height),
                    found: (image.size().width, image.size().height),
                });
            }
            total += image.num_channels();
        }
        let mut pixels = Array3::zeros((total, size.height, size.width));
        let mut offset = 0;
        for image in images {
            let n = image.num_channels();
            pixels.slice_mut(s![offset..offset + n, .., ..]).assign(&image.pixels);
            offset += n;
        }
        Self::new(pixels)
    }

    /// Resample every channel onto `size` in place.
    ///
    /// The interpolation policy is always explicit; observations use
    /// [`InterpolationMode::Nearest`] so that no smoothing is introduced.
    ///
    /// Errors
    /// ------
    /// - [`ImageError::InvalidTargetSize`] if `size` is empty.
    pub fn resize(&mut self, size: ImageSize, mode: InterpolationMode) -> ImageResult<()> {
        self.pixels = self.resized(size, mode)?.pixels;
        Ok(())
    }

    /// Resampled copy of this image.
    pub fn resized(&self, size: ImageSize, mode: InterpolationMode) -> ImageResult<ImageData> {
        if size.is_empty() {
            return Err(ImageError::InvalidTargetSize { width: size.width, height: size.height });
        }
        let mut pixels = Array3::zeros((self.num_channels(), size.height, size.width));
        for (mut dst, src) in pixels.axis_iter_mut(Axis(0)).zip(self.pixels.axis_iter(Axis(0))) {
            dst.assign(&resize_channel(src, size, mode));
        }
        Self::new(pixels)
    }

    fn check_channel(&self, channel: usize) -> ImageResult<()> {
        let num_channels = self.num_channels();
        if channel >= num_channels {
            return Err(ImageError::ChannelOutOfRange { channel, num_channels });
        }
        Ok(())
    }
}
