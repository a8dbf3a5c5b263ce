//! model — image-formation models consumed by the MAP objective.
//!
//! Purpose
//! -------
//! Define the capability the objective needs from a forward model: an
//! integer upsampling factor, a forward operator that turns an HR estimate
//! into a simulated observation of frame `index`, and the transpose of that
//! operator for analytic gradients.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both operators take and return images on the HR lattice; observations
//!   are resampled onto that lattice before the objective compares them.
//! - Operators must be free of observable side effects; the objective calls
//!   them through `&self` and may share a model across solver instances.
//! - `downsampling_scale() >= 1`; the solver validates this at construction.
//!
//! Downstream usage
//! ----------------
//! - External crates implement [`ImageModel`] for their blur/motion/sampling
//!   pipelines; [`BlockDownsamplingModel`] is the in-crate reference model.

pub mod downsampling;
pub mod errors;

pub use self::downsampling::BlockDownsamplingModel;
pub use self::errors::{ModelError, ModelResult};

use crate::image::ImageData;

/// Forward image-formation operator and its transpose.
///
/// - `apply_to_image(x, i)`: simulate observation `i` from HR image `x`.
/// - `apply_transpose_to_image(r, i)`: apply the transpose of the frame-`i`
///   operator to an HR-lattice image `r` (used for `Aᵀ(Ax − y)`).
pub trait ImageModel: Send + Sync {
    /// Integer factor between the LR and HR lattices.
    fn downsampling_scale(&self) -> usize;

    fn apply_to_image(&self, image: &ImageData, index: usize) -> ModelResult<ImageData>;

    fn apply_transpose_to_image(&self, image: &ImageData, index: usize) -> ModelResult<ImageData>;
}
