//! regularization — prior terms of the MAP objective.
//!
//! Purpose
//! -------
//! Describe the capability a prior must offer ([`Regularizer`]) and keep an
//! ordered, weighted list of priors ([`RegularizerRegistry`]) that the MAP
//! objective evaluates as `Σ_j w_j R_j(x)`.
//!
//! Key behaviors
//! -------------
//! - Regularizers are shared through `Arc<dyn Regularizer>`; the same
//!   instance may be bound several times, with independent weights, and may
//!   be held by other solvers at the same time.
//! - Regularizers without an analytic gradient are differentiated
//!   numerically by the registry.
//! - Two reference priors are provided: [`TikhonovRegularizer`] (squared
//!   neighbour differences) and [`TotalVariationRegularizer`] (smoothed
//!   gradient magnitude).
//!
//! Invariants & assumptions
//! ------------------------
//! - Evaluation goes through `&self` and has no observable side effects, so
//!   implementations are `Send + Sync`.
//! - Weights are finite and non-negative.
//! - When channels are solved separately, regularizers receive
//!   single-channel images and must not assume a fixed channel count.

pub mod errors;
pub mod registry;
pub mod tikhonov;
pub mod total_variation;

pub use self::errors::{RegularizerError, RegularizerResult};
pub use self::registry::{RegularizerBinding, RegularizerRegistry};
pub use self::tikhonov::TikhonovRegularizer;
pub use self::total_variation::TotalVariationRegularizer;

use crate::image::ImageData;

/// A prior term `R(x)` over multi-channel images.
///
/// Required:
/// - `name()`: label used in diagnostics.
/// - `cost(&ImageData)`: value of the prior.
///
/// Optional:
/// - `gradient(&ImageData)`: image of partial derivatives with the same
///   shape as the input. If not implemented, central differences are used.
pub trait Regularizer: Send + Sync {
    fn name(&self) -> &str;

    fn cost(&self, image: &ImageData) -> RegularizerResult<f64>;

    fn gradient(&self, _image: &ImageData) -> RegularizerResult<ImageData> {
        Err(RegularizerError::GradientNotImplemented)
    }
}
