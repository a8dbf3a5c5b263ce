//! Validation helpers for objective minimization.
//!
//! This module centralizes common consistency checks used across the
//! minimizer interface:
//!
//! - **Threshold checks**: [`verify_gradient_threshold`],
//!   [`verify_cost_threshold`], [`verify_parameter_threshold`] ensure
//!   stopping thresholds are finite and non-negative.
//! - **Differentiation**: [`verify_differentiation`] checks the numerical step.
//! - **Parameter vectors**: [`validate_theta`] checks length and finiteness of
//!   an input; [`validate_theta_hat`] unwraps and checks a solver estimate.
//! - **Gradients**: [`validate_grad`] checks length and finiteness.
//! - **Objective values**: [`validate_value`] checks cost outputs for
//!   finiteness.
//!
//! Each check reports the first offending value through a dedicated
//! [`OptError`] variant.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{Grad, Theta, traits::Differentiation},
};
use ndarray::Array1;

/// Validate the gradient-norm threshold (finite and `>= 0`).
///
/// # Errors
/// Returns [`OptError::InvalidGradientThreshold`] otherwise.
pub fn verify_gradient_threshold(value: f64) -> OptResult<()> {
    check_threshold(value).map_err(|reason| OptError::InvalidGradientThreshold { value, reason })
}

/// Validate the cost-decrease threshold (finite and `>= 0`).
///
/// # Errors
/// Returns [`OptError::InvalidCostThreshold`] otherwise.
pub fn verify_cost_threshold(value: f64) -> OptResult<()> {
    check_threshold(value).map_err(|reason| OptError::InvalidCostThreshold { value, reason })
}

/// Validate the parameter-variation threshold (finite and `>= 0`).
///
/// # Errors
/// Returns [`OptError::InvalidParameterThreshold`] otherwise.
pub fn verify_parameter_threshold(value: f64) -> OptResult<()> {
    check_threshold(value).map_err(|reason| OptError::InvalidParameterThreshold { value, reason })
}

fn check_threshold(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("Threshold must be finite.");
    }
    if value < 0.0 {
        return Err("Threshold must be non-negative.");
    }
    Ok(())
}

/// Validate the numerical differentiation step, if any.
///
/// # Errors
/// Returns [`OptError::InvalidDifferentiationStep`] if the step is
/// non-finite or `<= 0.0`.
pub fn verify_differentiation(differentiation: &Differentiation) -> OptResult<()> {
    if let Differentiation::Numerical { step } = *differentiation {
        if !step.is_finite() {
            return Err(OptError::InvalidDifferentiationStep {
                step,
                reason: "Step must be finite.",
            });
        }
        if step <= 0.0 {
            return Err(OptError::InvalidDifferentiationStep {
                step,
                reason: "Step must be positive.",
            });
        }
    }
    Ok(())
}

/// Check a starting point: length `dim`, finite entries.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] if `theta.len() != dim`.
/// - [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    match first_non_finite(theta) {
        Some((index, value)) => Err(OptError::InvalidThetaInput { index, value }),
        None => Ok(()),
    }
}

/// Check a gradient: length `dim`, finite entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad) {
        Some((index, value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient entries must be finite.",
        }),
        None => Ok(()),
    }
}

/// Take the backend's best estimate, rejecting a missing or non-finite one.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] for `None`.
/// - [`OptError::InvalidThetaHat`] for the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, value)) = first_non_finite(&theta_hat) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Estimated pixel values must be finite.",
        });
    }
    Ok(theta_hat)
}

/// # Errors
/// [`OptError::NonFiniteCost`] for `NaN` or `±∞`.
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

fn first_non_finite(values: &Array1<f64>) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}
