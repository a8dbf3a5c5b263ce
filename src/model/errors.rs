//! Errors raised by image-formation models.
//!
//! Model implementations live outside this crate as often as inside it, so
//! besides the structured variants there is an `Anyhow` catch-all that lets
//! external models report arbitrary failures through `?`.
use crate::image::ImageError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Upsampling/downsampling factor must be at least 1.
    InvalidScale {
        scale: usize,
    },

    /// Image lattice is not a whole number of model blocks.
    SizeNotDivisible {
        width: usize,
        height: usize,
        scale: usize,
    },

    /// Model output does not have the shape of the observation it is
    /// compared against, as `(channels, height, width)`.
    OutputShapeMismatch {
        index: usize,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    /// Pass-through for image container failures.
    Image(ImageError),

    // ---- Anyhow catchall ----
    Anyhow(String),
}

impl From<ImageError> for ModelError {
    fn from(err: ImageError) -> Self {
        ModelError::Image(err)
    }
}

impl From<anyhow::Error> for ModelError {
    fn from(err: anyhow::Error) -> Self {
        ModelError::Anyhow(err.to_string())
    }
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidScale { scale } => {
                write!(f, "Model Error: scale {scale} is invalid, must be at least 1")
            }
            ModelError::SizeNotDivisible { width, height, scale } => write!(
                f,
                "Model Error: image size {width}x{height} is not divisible by scale {scale}"
            ),
            ModelError::OutputShapeMismatch { index, expected, found } => write!(
                f,
                "Model Error: output for frame {index} has shape {found:?}, expected {expected:?}"
            ),
            ModelError::Image(err) => write!(f, "Model Error: {err}"),
            ModelError::Anyhow(msg) => write!(f, "Model Error: {msg}"),
        }
    }
}
