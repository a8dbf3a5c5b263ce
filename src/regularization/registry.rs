//! Ordered, weighted collection of regularizers.
//!
//! Purpose
//! -------
//! Hold the `(regularizer, weight)` bindings of one MAP objective and
//! evaluate their weighted sum and its gradient.
//!
//! Key behaviors
//! -------------
//! - [`RegularizerRegistry::add_regularizer`] appends without deduplication;
//!   binding one handle twice makes it contribute with the sum of both
//!   weights.
//! - [`RegularizerRegistry::regularization_parameter_sum`] is the sum of all
//!   weights, `0.0` for an empty registry. The solver feeds it into the
//!   adaptive threshold scaling.
//! - [`RegularizerRegistry::weighted_gradient`] differentiates regularizers
//!   without an analytic gradient by central differences, retried with
//!   forward differences like the minimizer does.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights are finite and `>= 0`, checked on insertion.
//! - Bindings are evaluated in insertion order; zero-weight bindings are
//!   skipped.
//!
//! Testing notes
//! -------------
//! - Unit tests cover weight sums (including duplicate handles), weight
//!   validation, weighted evaluation and the finite-difference fallback.
use crate::{
    image::ImageData,
    optimization::minimizer::finite_diff::central_then_forward,
    regularization::{
        Regularizer,
        errors::{RegularizerError, RegularizerResult},
    },
};
use ndarray::Array1;
use std::sync::Arc;

/// One regularizer handle together with its weight.
#[derive(Clone)]
pub struct RegularizerBinding {
    pub regularizer: Arc<dyn Regularizer>,
    pub weight: f64,
}

impl std::fmt::Debug for RegularizerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegularizerBinding")
            .field("regularizer", &self.regularizer.name())
            .field("weight", &self.weight)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegularizerRegistry {
    bindings: Vec<RegularizerBinding>,
}

impl RegularizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding.
    ///
    /// Errors
    /// ------
    /// - [`RegularizerError::InvalidWeight`] if `weight` is negative or not
    ///   finite. The registry is left unchanged.
    pub fn add_regularizer(
        &mut self, regularizer: Arc<dyn Regularizer>, weight: f64,
    ) -> RegularizerResult<()> {
        if !weight.is_finite() {
            return Err(RegularizerError::InvalidWeight {
                weight,
                reason: "Weight must be finite.",
            });
        }
        if weight < 0.0 {
            return Err(RegularizerError::InvalidWeight {
                weight,
                reason: "Weight must be non-negative.",
            });
        }
        self.bindings.push(RegularizerBinding { regularizer, weight });
        Ok(())
    }

    /// Sum of all binding weights.
    pub fn regularization_parameter_sum(&self) -> f64 {
        self.bindings.iter().map(|b| b.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[RegularizerBinding] {
        &self.bindings
    }

    /// `Σ_j w_j R_j(image)` over all bindings with non-zero weight.
    ///
    /// Errors
    /// ------
    /// - Any error from a regularizer's `cost`.
    /// - [`RegularizerError::NonFiniteCost`] if a regularizer returns `NaN`
    ///   or `±∞`.
    pub fn weighted_cost(&self, image: &ImageData) -> RegularizerResult<f64> {
        let mut total = 0.0;
        for binding in self.active() {
            let value = binding.regularizer.cost(image)?;
            if !value.is_finite() {
                return Err(RegularizerError::NonFiniteCost {
                    name: binding.regularizer.name().to_string(),
                    value,
                });
            }
            total += binding.weight * value;
        }
        Ok(total)
    }

    /// `Σ_j w_j ∇R_j(image)`, an image of the same shape as `image`.
    ///
    /// Regularizers reporting `GradientNotImplemented` are differentiated
    /// numerically through [`central_then_forward`].
    ///
    /// Errors
    /// ------
    /// - Any other error from a regularizer.
    /// - [`RegularizerError::GradientShapeMismatch`] if an analytic gradient
    ///   has the wrong shape.
    pub fn weighted_gradient(&self, image: &ImageData) -> RegularizerResult<ImageData> {
        let mut total = ImageData::zeros(image.size(), image.num_channels())?;
        for binding in self.active() {
            let regularizer = binding.regularizer.as_ref();
            let gradient = match regularizer.gradient(image) {
                Ok(g) => g,
                Err(RegularizerError::GradientNotImplemented) => {
                    numerical_gradient(regularizer, image)?
                }
                Err(e) => return Err(e),
            };
            if gradient.pixels().dim() != image.pixels().dim() {
                return Err(RegularizerError::GradientShapeMismatch {
                    name: regularizer.name().to_string(),
                    expected: image.pixels().dim(),
                    found: gradient.pixels().dim(),
                });
            }
            total.pixels_mut().scaled_add(binding.weight, gradient.pixels());
        }
        Ok(total)
    }

    fn active(&self) -> impl Iterator<Item = &RegularizerBinding> {
        self.bindings.iter().filter(|b| b.weight != 0.0)
    }
}

/// Finite-difference gradient of `regularizer.cost` at `image`.
fn numerical_gradient(
    regularizer: &dyn Regularizer, image: &ImageData,
) -> RegularizerResult<ImageData> {
    let size = image.size();
    let num_channels = image.num_channels();
    let cost_at = |x: &Array1<f64>| -> RegularizerResult<f64> {
        regularizer.cost(&ImageData::from_theta(x, size, num_channels)?)
    };
    let grad = central_then_forward(&image.to_theta(), cost_at)?;
    Ok(ImageData::from_theta(&grad, size, num_channels)?)
}
