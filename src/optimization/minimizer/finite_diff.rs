//! minimizer::finite_diff — finite-difference gradient helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference gradient approximations around a parameter
//! vector, together with validation, so that the rest of the minimizer can
//! request derivatives without depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - [`central_then_forward`]: central differences of any fallible scalar
//!   function, retried with forward differences if the central pass hits an
//!   error or yields a non-finite entry. Shared by the minimizer and the
//!   regularizer registry.
//! - [`fd_gradient`]: the same over an objective, with the result checked by
//!   [`validate_grad`]. Used when an analytic gradient is missing.
//! - [`forward_diff_with_step`]: forward differences with a caller-chosen
//!   step, used by numerical differentiation mode.
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` closures return plain `f64`, so the first error of a pass
//!   is parked in a `RefCell` and reported once the pass finishes.
//! - Gradients returned by [`fd_gradient`] and [`forward_diff_with_step`]
//!   satisfy [`validate_grad`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the fallback at a domain edge, error propagation out
//!   of the closures, and the configurable step.
use crate::optimization::{
    errors::OptResult,
    minimizer::{Grad, Theta, validation::validate_grad},
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// central_then_forward — finite-difference gradient of a fallible function.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `F`
///   Scalar function whose error type `E` is handed back unchanged.
///
/// Returns
/// -------
/// The central-difference gradient when every evaluation succeeds and every
/// entry is finite. Otherwise the forward-difference gradient, which may
/// still contain non-finite entries.
///
/// Errors
/// ------
/// - The first error raised by `func` during the forward pass.
pub fn central_then_forward<E, F>(theta: &Theta, func: F) -> Result<Grad, E>
where
    F: Fn(&Theta) -> Result<f64, E>,
{
    let captured: RefCell<Option<E>> = RefCell::new(None);
    let infallible = |x: &Theta| -> f64 {
        func(x).unwrap_or_else(|err| {
            let mut slot = captured.borrow_mut();
            if slot.is_none() {
                *slot = Some(err);
            }
            f64::NAN
        })
    };

    let central = theta.central_diff(&infallible);
    if captured.borrow().is_none() && central.iter().all(|v| v.is_finite()) {
        return Ok(central);
    }

    captured.replace(None);
    let forward = theta.forward_diff(&infallible);
    match captured.take() {
        Some(err) => Err(err),
        None => Ok(forward),
    }
}

/// fd_gradient — validated [`central_then_forward`] over an objective.
///
/// # Errors
/// - Errors raised by `func` on the forward path.
/// - `OptError::InvalidGradient` if the forward gradient is still non-finite.
pub fn fd_gradient<F>(theta: &Theta, func: &F) -> OptResult<Grad>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let grad = central_then_forward(theta, func)?;
    validate_grad(&grad, theta.len())?;
    Ok(grad)
}

/// forward_diff_with_step — forward differences with an explicit step.
///
/// Computes `g_k = (f(θ + h e_k) − f(θ)) / h` for every coordinate `k`,
/// reusing one perturbed copy of `theta`.
///
/// # Errors
/// - Propagates the first error from `func`.
/// - `OptError::InvalidGradient` if any component is non-finite.
pub fn forward_diff_with_step<F>(theta: &Theta, step: f64, func: &F) -> OptResult<Grad>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let base = func(theta)?;
    let mut probe = theta.clone();
    let mut grad = Grad::zeros(theta.len());
    for k in 0..theta.len() {
        let original = probe[k];
        probe[k] = original + step;
        let shifted = func(&probe)?;
        probe[k] = original;
        grad[k] = (shifted - base) / step;
    }
    validate_grad(&grad, theta.len())?;
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::{BackendErrorKind, OptError};
    use approx::assert_abs_diff_eq;
    use argmin::core::{ArgminError, Error};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Central differences and the forward fallback of `fd_gradient`.
    // - Error propagation out of the `f64`-only finitediff closures.
    // - The explicit step of `forward_diff_with_step`.
    //
    // They intentionally DO NOT cover:
    // - Accuracy of finitediff itself beyond smooth polynomials.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An objective that is undefined just left of `θ` forces the forward
    // fallback, which still yields the one-sided slope.
    //
    // Given
    // -----
    // - `f(x) = 2 x0` for `x0 >= 1`, `NaN` below, evaluated at `x0 = 1`.
    //
    // Expect
    // ------
    // - Gradient `[2]` within `1e-6`.
    fn fd_gradient_falls_back_to_forward_at_domain_edge() {
        let theta: Theta = array![1.0];
        let f = |x: &Theta| -> OptResult<f64> {
            Ok(if x[0] < 1.0 { f64::NAN } else { 2.0 * x[0] })
        };

        let grad = fd_gradient(&theta, &f).unwrap();

        assert_abs_diff_eq!(grad[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // A backend error raised inside the closure is what the caller sees,
    // not the `NaN` the closure had to return.
    fn captured_backend_error_is_reported() {
        let theta: Theta = array![0.5, 0.5];
        let f = |_: &Theta| -> OptResult<f64> {
            let err: Error = ArgminError::NotImplemented { text: "probe".to_string() }.into();
            Err(err.into())
        };

        let err = fd_gradient(&theta, &f).unwrap_err();

        assert!(
            matches!(err, OptError::Backend { kind: BackendErrorKind::NotImplemented, .. }),
            "got {err:?}"
        );
    }

    #[test]
    // Purpose
    // -------
    // A closure that never fails but is `NaN` everywhere ends in
    // `InvalidGradient` after both passes.
    fn nan_everywhere_is_an_invalid_gradient() {
        let theta: Theta = array![0.0, 1.0];
        let f = |_: &Theta| -> OptResult<f64> { Ok(f64::NAN) };

        let err = fd_gradient(&theta, &f).unwrap_err();

        assert!(matches!(err, OptError::InvalidGradient { .. }), "got {err:?}");
    }

    #[test]
    // Purpose
    // -------
    // `fd_gradient` returns the central-difference gradient when every
    // evaluation succeeds, and the objective's own error when it fails.
    //
    // Given
    // -----
    // - `f(x) = 3 x0² + x1` at `[1, -2]` (gradient `[6, 1]`).
    // - An objective that fails with `NonFiniteCost`.
    fn fd_gradient_uses_central_and_propagates_errors() {
        let theta: Theta = array![1.0, -2.0];
        let f = |x: &Theta| -> OptResult<f64> { Ok(3.0 * x[0] * x[0] + x[1]) };

        let grad = fd_gradient(&theta, &f).unwrap();
        assert_abs_diff_eq!(grad[0], 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(grad[1], 1.0, epsilon = 1e-5);

        let failing =
            |_: &Theta| -> OptResult<f64> { Err(OptError::NonFiniteCost { value: f64::NAN }) };
        let err = fd_gradient(&theta, &failing).unwrap_err();
        assert!(matches!(err, OptError::NonFiniteCost { .. }), "got {err:?}");
    }

    #[test]
    // Purpose
    // -------
    // The configurable step is actually used: for `f(x) = x²` the forward
    // quotient at `x = 0` equals the step.
    //
    // Expect
    // ------
    // - `step = 0.5` gives `g = 0.5`; `step = 1e-3` gives `g = 1e-3`.
    fn forward_diff_with_step_uses_given_step() {
        let theta: Theta = array![0.0];
        let f = |x: &Theta| -> OptResult<f64> { Ok(x[0] * x[0]) };

        let coarse = forward_diff_with_step(&theta, 0.5, &f).unwrap();
        let fine = forward_diff_with_step(&theta, 1e-3, &f).unwrap();

        assert_abs_diff_eq!(coarse[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fine[0], 1e-3, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The shared helper hands back the caller's own error type, and only
    // errors from the forward pass count.
    //
    // Given
    // -----
    // - A function failing with a `String` left of `x0 = 1`, linear (slope
    //   3) elsewhere.
    // - A function failing everywhere.
    //
    // Expect
    // ------
    // - Slope `3` from the forward pass at `x0 = 1`.
    // - The first `String` error otherwise.
    fn central_then_forward_keeps_caller_error_type() {
        let theta: Theta = array![1.0];
        let edge = |x: &Theta| -> Result<f64, String> {
            if x[0] < 1.0 { Err("below domain".to_string()) } else { Ok(3.0 * x[0]) }
        };
        let broken = |_: &Theta| -> Result<f64, String> { Err("broken".to_string()) };

        let grad = central_then_forward(&theta, edge).unwrap();

        assert_abs_diff_eq!(grad[0], 3.0, epsilon = 1e-6);
        assert_eq!(central_then_forward(&theta, broken).unwrap_err(), "broken");
    }
}
