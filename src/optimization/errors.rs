//! Errors raised while configuring or running the minimizer.
//!
//! Everything the optimization layer can fail on funnels into [`OptError`]:
//! rejected options, bad starting points, numerical breakdown of the
//! objective, failures of the image model, regularizers or image container
//! consulted by the objective, and argmin's own errors. Crate errors that
//! pass through argmin (as `argmin::core::Error`) are recovered intact.
use crate::{image::ImageError, model::ModelError, regularization::RegularizerError};
use argmin::core::{ArgminError, Error};

pub type OptResult<T> = Result<T, OptError>;

/// Kind of failure reported by the argmin backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    InvalidParameter,
    NotImplemented,
    NotInitialized,
    ConditionViolated,
    CheckpointNotFound,
    PotentialBug,
    ImpossibleError,
    /// Anything argmin raises that is not one of its own error kinds.
    Other,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BackendErrorKind::InvalidParameter => "invalid parameter",
            BackendErrorKind::NotImplemented => "not implemented",
            BackendErrorKind::NotInitialized => "not initialized",
            BackendErrorKind::ConditionViolated => "condition violated",
            BackendErrorKind::CheckpointNotFound => "checkpoint not found",
            BackendErrorKind::PotentialBug => "potential bug",
            BackendErrorKind::ImpossibleError => "impossible error",
            BackendErrorKind::Other => "backend failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// The objective has no analytic gradient; finite differences take over.
    GradientNotImplemented,

    /// Gradient length differs from the parameter count.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient entry at `index` is unusable (e.g. `NaN`).
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- SolverOptions ----
    InvalidGradientThreshold {
        value: f64,
        reason: &'static str,
    },
    InvalidCostThreshold {
        value: f64,
        reason: &'static str,
    },
    InvalidParameterThreshold {
        value: f64,
        reason: &'static str,
    },
    /// Numerical differentiation needs a finite, strictly positive step.
    InvalidDifferentiationStep {
        step: f64,
        reason: &'static str,
    },
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    InvalidSolverKind {
        name: String,
        reason: &'static str,
    },
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Evaluation ----
    /// Objective value is `NaN` or infinite.
    NonFiniteCost {
        value: f64,
    },

    /// Parameter vector length differs from the objective's dimension.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Parameter vector (starting point or backend proposal) contains a
    /// non-finite entry.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Run outcome ----
    /// Final estimate contains an unusable entry.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Backend finished without a best parameter vector.
    MissingThetaHat,

    /// Error raised by argmin.
    Backend {
        kind: BackendErrorKind,
        text: String,
    },

    // ---- Objective collaborators ----
    Model(ModelError),
    Regularizer(RegularizerError),
    Image(ImageError),
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => {
                write!(f, "Optimization Error: objective provides no analytic gradient")
            }
            OptError::GradientDimMismatch { expected, found } => write!(
                f,
                "Optimization Error: gradient has {found} entries, objective has {expected} parameters"
            ),
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Optimization Error: gradient entry {index} is {value}: {reason}")
            }

            OptError::InvalidGradientThreshold { value, reason } => {
                write!(f, "Optimization Error: gradient norm threshold {value} rejected: {reason}")
            }
            OptError::InvalidCostThreshold { value, reason } => {
                write!(f, "Optimization Error: cost decrease threshold {value} rejected: {reason}")
            }
            OptError::InvalidParameterThreshold { value, reason } => write!(
                f,
                "Optimization Error: parameter variation threshold {value} rejected: {reason}"
            ),
            OptError::InvalidDifferentiationStep { step, reason } => {
                write!(f, "Optimization Error: differentiation step {step} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Optimization Error: iteration budget {max_iter} rejected: {reason}")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Optimization Error: unknown line search '{name}': {reason}")
            }
            OptError::InvalidSolverKind { name, reason } => {
                write!(f, "Optimization Error: unknown least squares solver '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Optimization Error: L-BFGS history size {mem} rejected: {reason}")
            }

            OptError::NonFiniteCost { value } => {
                write!(f, "Optimization Error: objective evaluated to {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => write!(
                f,
                "Optimization Error: parameter vector has {actual} entries, expected {expected}"
            ),
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Optimization Error: parameter entry {index} is {value}")
            }

            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Optimization Error: estimate entry {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Optimization Error: backend returned no estimate")
            }
            OptError::Backend { kind, text } => {
                write!(f, "Optimization Error: argmin reported {kind}: {text}")
            }

            OptError::Model(err) => write!(f, "{err}"),
            OptError::Regularizer(err) => write!(f, "{err}"),
            OptError::Image(err) => write!(f, "{err}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(ours) => return ours,
            Err(err) => err,
        };
        let (kind, text) = match err.downcast::<ArgminError>() {
            Ok(ArgminError::InvalidParameter { text }) => (BackendErrorKind::InvalidParameter, text),
            Ok(ArgminError::NotImplemented { text }) => (BackendErrorKind::NotImplemented, text),
            Ok(ArgminError::NotInitialized { text }) => (BackendErrorKind::NotInitialized, text),
            Ok(ArgminError::ConditionViolated { text }) => {
                (BackendErrorKind::ConditionViolated, text)
            }
            Ok(ArgminError::CheckpointNotFound { text }) => {
                (BackendErrorKind::CheckpointNotFound, text)
            }
            Ok(ArgminError::PotentialBug { text }) => (BackendErrorKind::PotentialBug, text),
            Ok(ArgminError::ImpossibleError { text }) => (BackendErrorKind::ImpossibleError, text),
            Ok(other) => (BackendErrorKind::Other, other.to_string()),
            Err(other) => (BackendErrorKind::Other, other.to_string()),
        };
        OptError::Backend { kind, text }
    }
}

impl From<ModelError> for OptError {
    fn from(err: ModelError) -> Self {
        OptError::Model(err)
    }
}

impl From<RegularizerError> for OptError {
    /// A regularizer without an analytic gradient keeps its meaning as the
    /// finite-difference marker.
    fn from(err: RegularizerError) -> Self {
        match err {
            RegularizerError::GradientNotImplemented => OptError::GradientNotImplemented,
            other => OptError::Regularizer(other),
        }
    }
}

impl From<ImageError> for OptError {
    fn from(err: ImageError) -> Self {
        OptError::Image(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // A crate error that travelled through argmin's `Error` comes back
    // unchanged, so failed runs report the real cause.
    fn crate_error_survives_argmin_round_trip() {
        let original = OptError::NonFiniteCost { value: f64::INFINITY };
        let wrapped: Error = original.clone().into();

        assert_eq!(OptError::from(wrapped), original);
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds keep their kind and message.
    fn argmin_error_kinds_are_mapped() {
        let wrapped: Error = ArgminError::ConditionViolated { text: "bad".to_string() }.into();

        assert_eq!(
            OptError::from(wrapped),
            OptError::Backend {
                kind: BackendErrorKind::ConditionViolated,
                text: "bad".to_string()
            }
        );
    }

    #[test]
    fn missing_regularizer_gradient_maps_to_fd_marker() {
        assert_eq!(
            OptError::from(RegularizerError::GradientNotImplemented),
            OptError::GradientNotImplemented
        );
        assert!(matches!(
            OptError::from(RegularizerError::InvalidSmoothing { value: -1.0, reason: "x" }),
            OptError::Regularizer(_)
        ));
    }
}
