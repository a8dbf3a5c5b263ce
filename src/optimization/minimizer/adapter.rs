//! Adapter that exposes an [`Objective`] as an `argmin` problem.
//!
//! The objective is minimized as given. Gradients come from one of three
//! places, depending on the configured [`Differentiation`]:
//! the objective's analytic gradient, central differences when that gradient
//! is missing, or forward differences with a fixed step when numerical
//! differentiation is requested.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        finite_diff::{fd_gradient, forward_diff_with_step},
        traits::{Differentiation, Objective},
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_theta, validate_value},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges an [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// Both argmin entry points first reject a parameter vector with non-finite
/// entries (`InvalidThetaInput`), so a broken backend step never reaches the
/// model or the regularizers.
///
/// - `CostFunction::cost` returns `f(θ)` and rejects non-finite values.
/// - `Gradient::gradient` returns:
///   - `∇f(θ)` from the objective in analytical mode,
///   - a central-difference gradient if the objective reports
///     `GradientNotImplemented`,
///   - a forward-difference gradient with the configured step in numerical
///     mode.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub differentiation: Differentiation,
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over an objective.
    pub fn new(f: &'a F, differentiation: Differentiation) -> Self {
        Self { f, differentiation }
    }

    /// Evaluate the objective and check the value is finite.
    ///
    /// # Errors
    /// - Any error from `Objective::cost`.
    /// - `OptError::NonFiniteCost` for `NaN`/`±∞`.
    pub fn evaluate(&self, theta: &Theta) -> OptResult<Cost> {
        let value = self.f.cost(theta)?;
        validate_value(value)?;
        Ok(value)
    }

    /// Gradient of the objective according to `self.differentiation`.
    ///
    /// # Errors
    /// - Objective errors other than `GradientNotImplemented`.
    /// - Errors from cost evaluations performed during finite differencing.
    /// - Validation errors for wrong dimension or non-finite entries.
    pub fn evaluate_gradient(&self, theta: &Theta) -> OptResult<Grad> {
        let dim = theta.len();
        let cost_func = |x: &Theta| self.evaluate(x);
        match self.differentiation {
            Differentiation::Numerical { step } => forward_diff_with_step(theta, step, &cost_func),
            Differentiation::Analytical => match self.f.gradient(theta) {
                Ok(g) => {
                    validate_grad(&g, dim)?;
                    Ok(g)
                }
                Err(OptError::GradientNotImplemented) => fd_gradient(theta, &cost_func),
                Err(e) => Err(e),
            },
        }
    }
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        validate_theta(theta, self.f.num_parameters())?;
        Ok(self.evaluate(theta)?)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        validate_theta(theta, self.f.num_parameters())?;
        Ok(self.evaluate_gradient(theta)?)
    }
}
