//! Errors raised while binding or evaluating regularizers.
use crate::image::ImageError;

pub type RegularizerResult<T> = Result<T, RegularizerError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RegularizerError {
    // ---- Gradient ----
    /// Regularizer has no analytic gradient; finite differences are used.
    GradientNotImplemented,

    /// Regularizer gradient does not have the shape of its input image.
    GradientShapeMismatch {
        name: String,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    // ---- Registry ----
    /// Binding weights need to be finite and non-negative.
    InvalidWeight {
        weight: f64,
        reason: &'static str,
    },

    // ---- Regularizer parameters ----
    /// Smoothing parameter of a regularizer needs to be positive and finite.
    InvalidSmoothing {
        value: f64,
        reason: &'static str,
    },

    // ---- Evaluation ----
    /// A regularizer produced a non-finite cost.
    NonFiniteCost {
        name: String,
        value: f64,
    },

    /// Pass-through for image container failures.
    Image(ImageError),
}

impl From<ImageError> for RegularizerError {
    fn from(err: ImageError) -> Self {
        RegularizerError::Image(err)
    }
}

impl std::error::Error for RegularizerError {}

impl std::fmt::Display for RegularizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            RegularizerError::GradientNotImplemented => {
                write!(f, "Regularizer Error: analytic gradient not implemented")
            }
            RegularizerError::GradientShapeMismatch { name, expected, found } => write!(
                f,
                "Regularizer Error: gradient of '{name}' has shape {found:?}, expected {expected:?}"
            ),

            // ---- Registry ----
            RegularizerError::InvalidWeight { weight, reason } => {
                write!(f, "Regularizer Error: invalid weight {weight}: {reason}")
            }

            // ---- Regularizer parameters ----
            RegularizerError::InvalidSmoothing { value, reason } => {
                write!(f, "Regularizer Error: invalid smoothing parameter {value}: {reason}")
            }

            // ---- Evaluation ----
            RegularizerError::NonFiniteCost { name, value } => {
                write!(f, "Regularizer Error: '{name}' returned non-finite cost {value}")
            }
            RegularizerError::Image(err) => write!(f, "Regularizer Error: {err}"),
        }
    }
}
