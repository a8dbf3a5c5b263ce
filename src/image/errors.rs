//! Error surface for image containers and resampling.
//!
//! `ImageError` covers shape violations detected when building an
//! [`ImageData`](crate::image::data::ImageData), when converting between
//! images and flat parameter vectors, and when resampling onto a new grid.
//! An alias `ImageResult<T>` standardizes return types across the module.

/// Result alias for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageError {
    // ---- Construction ----
    /// Images need at least one channel.
    NoChannels,

    /// Width and height must both be non-zero.
    EmptyImage {
        width: usize,
        height: usize,
    },

    /// Stacked channels must all share one size.
    ChannelSizeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    // ---- Parameter vectors ----
    /// Flat buffer length does not match `width * height * channels`.
    BufferLengthMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Channel access ----
    /// Requested channel does not exist.
    ChannelOutOfRange {
        channel: usize,
        num_channels: usize,
    },

    // ---- Resampling ----
    /// Target size for a resize must be non-empty.
    InvalidTargetSize {
        width: usize,
        height: usize,
    },

    /// Interpolation name not recognised.
    UnknownInterpolation {
        name: String,
    },
}

impl std::error::Error for ImageError {}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            ImageError::NoChannels => write!(f, "Image Error: image has no channels"),
            ImageError::EmptyImage { width, height } => {
                write!(f, "Image Error: image size {width}x{height} is empty")
            }
            ImageError::ChannelSizeMismatch { index, expected, found } => write!(
                f,
                "Image Error: channel {index} has size {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),

            // ---- Parameter vectors ----
            ImageError::BufferLengthMismatch { expected, found } => {
                write!(f, "Image Error: buffer length mismatch: expected {expected}, found {found}")
            }

            // ---- Channel access ----
            ImageError::ChannelOutOfRange { channel, num_channels } => write!(
                f,
                "Image Error: channel {channel} out of range for image with {num_channels} channels"
            ),

            // ---- Resampling ----
            ImageError::InvalidTargetSize { width, height } => {
                write!(f, "Image Error: cannot resize to empty size {width}x{height}")
            }
            ImageError::UnknownInterpolation { name } => {
                write!(f, "Image Error: unknown interpolation '{name}' (expected 'nearest' or 'linear')")
            }
        }
    }
}
