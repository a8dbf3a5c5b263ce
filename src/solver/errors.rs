//! Error surface of the MAP solver.
//!
//! Construction failures are reported as their own variants so a caller can
//! tell a bad frame set from a failed run. Everything that goes wrong while
//! the backend is running arrives as [`SolverError::Optimization`].
use crate::{image::ImageError, optimization::errors::OptError, regularization::RegularizerError};

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    // ---- Construction ----
    /// At least one low-resolution frame is required.
    NoObservations,

    /// Frame `index` has a different channel count than frame 0.
    ChannelCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Frame `index` has a different size than frame 0, as `(width, height)`.
    ImageSizeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Model upsampling factor must be at least 1.
    InvalidUpsamplingScale {
        scale: usize,
    },

    /// `pixels * channels` exceeds the supported index range.
    DataPointOverflow {
        width: usize,
        height: usize,
        channels: usize,
        max: usize,
    },

    // ---- Solve ----
    /// Initial estimate does not match the HR size and channel count, as
    /// `(channels, width, height)`.
    InitialEstimateMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    // ---- Pass-through ----
    Image(ImageError),
    Regularizer(RegularizerError),
    Optimization(OptError),
}

impl From<ImageError> for SolverError {
    fn from(err: ImageError) -> Self {
        SolverError::Image(err)
    }
}

impl From<RegularizerError> for SolverError {
    fn from(err: RegularizerError) -> Self {
        SolverError::Regularizer(err)
    }
}

impl From<OptError> for SolverError {
    fn from(err: OptError) -> Self {
        SolverError::Optimization(err)
    }
}

impl std::error::Error for SolverError {}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            SolverError::NoObservations => {
                write!(f, "Solver Error: cannot super-resolve with 0 low-res images")
            }
            SolverError::ChannelCountMismatch { index, expected, found } => write!(
                f,
                "Solver Error: image {index} has {found} channels, expected {expected}"
            ),
            SolverError::ImageSizeMismatch { index, expected, found } => write!(
                f,
                "Solver Error: image {index} has size {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            SolverError::InvalidUpsamplingScale { scale } => {
                write!(f, "Solver Error: upsampling scale {scale} is invalid, must be at least 1")
            }
            SolverError::DataPointOverflow { width, height, channels, max } => write!(
                f,
                "Solver Error: {width}x{height} pixels with {channels} channels exceeds the \
                 maximum of {max} data points"
            ),

            // ---- Solve ----
            SolverError::InitialEstimateMismatch { expected, found } => write!(
                f,
                "Solver Error: initial estimate has shape {found:?}, expected {expected:?} \
                 (channels, width, height)"
            ),

            // ---- Pass-through ----
            SolverError::Image(err) => write!(f, "Solver Error: {err}"),
            SolverError::Regularizer(err) => write!(f, "Solver Error: {err}"),
            SolverError::Optimization(err) => write!(f, "Solver Error: {err}"),
        }
    }
}
