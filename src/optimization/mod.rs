//! optimization — argmin-backed minimizer and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer the MAP solver runs on: a generic
//! minimizer for smooth objectives and a single error/result surface.
//! Callers implement an objective, choose solver options, and obtain the
//! minimizer and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing** objectives `f(θ)`
//!   (`minimizer`), including backend selection (L-BFGS or nonlinear
//!   conjugate gradient), differentiation mode and stopping thresholds.
//! - Normalize configuration issues, numerical failures, collaborator
//!   failures (models, regularizers, images) and backend solver errors into
//!   a single enum (`errors::OptError`) with a common result alias
//!   (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//!
//! Conventions
//! -----------
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw argmin errors.
//! - This module avoids logging of its own; the solver layer reports
//!   progress, and the optional `obs_slog` feature attaches argmin's
//!   terminal observer.
//!
//! Testing notes
//! -------------
//! - `minimizer`: gradient paths, thresholds, option validation and small
//!   end-to-end solves.
//! - `errors`: conversions from argmin and collaborator errors.

pub mod errors;
pub mod minimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use map_super_resolution::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
}
