//! map_super_resolution — MAP objective core for multi-frame super-resolution.
//!
//! Purpose
//! -------
//! Assemble the Maximum-A-Posteriori objective of a multi-frame
//! super-resolution problem (data fidelity of a candidate HR image, pushed
//! through an image-formation model, against every observed LR frame, plus a
//! weighted sum of priors) and minimize it with argmin's L-BFGS or nonlinear
//! conjugate gradient.
//!
//! Key behaviors
//! -------------
//! - `image`: validated multi-channel images, flat-vector conversion and
//!   explicit-mode resampling.
//! - `model`: the forward model capability and a block-downsampling
//!   reference model.
//! - `regularization`: shared, weighted priors with numerical-gradient
//!   fallback.
//! - `optimization`: generic minimizer, solver options with adaptive
//!   thresholds, unified optimizer errors.
//! - `solver`: the MAP solver (construction checks, dimension accounting,
//!   joint and per-channel solves).
//!
//! Conventions
//! -----------
//! - Images are `f64`, indexed `(channel, row, col)`; parameter vectors are
//!   channel-major.
//! - Every fallible operation returns a module-specific `Result` alias; the
//!   crate does not panic on bad input.
//! - Logging uses `tracing` and is off unless a solver is built verbose.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use map_super_resolution::prelude::*;
//! use std::sync::Arc;
//!
//! # fn frames() -> Vec<ImageData> { unimplemented!() }
//! let model = BlockDownsamplingModel::new(2)?;
//! let frames = frames();
//! let mut solver = MapSolver::new(&model, &frames, false)?;
//! solver.add_regularizer(Arc::new(TotalVariationRegularizer::default()), 0.01)?;
//!
//! let initial = ImageData::zeros(solver.image_size(), solver.num_channels())?;
//! let outcome = solver.solve(&initial, &SolverOptions::default())?;
//! println!("{} after {} iterations", outcome.status(), outcome.total_iterations());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod image;
pub mod model;
pub mod optimization;
pub mod regularization;
pub mod solver;

pub mod prelude {
    pub use crate::image::{ImageData, ImageSize, InterpolationMode};
    pub use crate::model::{BlockDownsamplingModel, ImageModel};
    pub use crate::optimization::minimizer::{
        ConvergenceThresholds, Differentiation, LeastSquaresSolver, LineSearcher, RunStatus,
        SolverOptions, StoppingRule,
    };
    pub use crate::regularization::{
        Regularizer, TikhonovRegularizer, TotalVariationRegularizer,
    };
    pub use crate::solver::{MapSolver, SolveOutcome, Solver, SolverError};
}
