//! minimizer — argmin-powered minimizer for MAP objectives.
//!
//! Purpose
//! -------
//! Provide a high-level, argmin-backed optimization layer for **minimizing**
//! smooth objectives `f(θ)`. Callers implement a single trait,
//! [`Objective`], and invoke [`minimize`] to run L-BFGS or nonlinear
//! conjugate gradient with a configurable line search, stopping thresholds
//! and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Bridge objectives into argmin via [`adapter::ArgMinAdapter`], choosing
//!   analytic, central-difference or fixed-step forward-difference gradients.
//! - Expose a single entrypoint [`minimize`] that:
//!   - validates the initial guess,
//!   - selects a backend via [`builders`],
//!   - executes it via [`run::run_solver`] under the thresholds of
//!     [`convergence`], and
//!   - normalizes results into an [`RunOutcome`].
//! - Centralize configuration ([`SolverOptions`]) and validation logic
//!   ([`validation`]) so downstream code can assume sane, finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::cost`] and [`Objective::gradient`] treat invalid inputs as
//!   recoverable [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - [`SolverOptions`] is validated on construction and treated as
//!   internally consistent by the solver layer.
//!
//! Conventions
//! -----------
//! - Parameters are flat [`Theta`] vectors (`Array1<f64>`); the image layer
//!   owns the mapping between images and vectors.
//! - Errors bubble up as `OptResult<T>`; this module and its children never
//!   intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - The MAP solver implements [`Objective`] for its joint and per-channel
//!   problems and calls [`minimize`] once per (sub-)problem.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient paths in [`adapter`], threshold
//!   logic in [`convergence`], option validation and reporting in
//!   [`options`], and end-to-end solves of small quadratics in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod convergence;
pub mod finite_diff;
pub mod options;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::convergence::{ConvergenceThresholds, StoppingRule};
pub use self::options::SolverOptions;
pub use self::traits::{
    Differentiation, LeastSquaresSolver, LineSearcher, Objective, RunOutcome, RunStatus,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use map_super_resolution::optimization::minimizer::prelude::*;
//
// to import the main minimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::options::SolverOptions;
    pub use super::traits::{Differentiation, LeastSquaresSolver, Objective, RunOutcome};
    pub use super::types::{Cost, Grad, Theta};
}
