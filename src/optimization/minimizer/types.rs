//! minimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and argmin solver aliases used by the
//! minimizer, so the rest of the optimization code stays agnostic to
//! `ndarray` and argmin generics.
//!
//! Key behaviors
//! -------------
//! - Canonical aliases for parameter vectors, gradients and scalar costs
//!   (`Theta`, `Grad`, `Cost`).
//! - A map type for argmin function-evaluation counters (`FnEvalMap`).
//! - Pre-wired L-BFGS and nonlinear conjugate-gradient aliases for both
//!   supported line searches.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` have length equal to the number of free parameters,
//!   i.e. `pixels * channels` of the (sub-)problem being minimized.
//! - `Cost` is the MAP objective value; it is minimized directly, no sign
//!   flips are involved.
//!
//! Testing notes
//! -------------
//! - Only aliases and constants live here; the surrounding modules exercise
//!   them.
use argmin::solver::{
    conjugategradient::{NonlinearConjugateGradient, beta::PolakRibiere},
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector: the flattened, channel-major HR estimate.
pub type Theta = Array1<f64>;

/// Gradient of the cost with respect to `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Iterations between forced restarts of nonlinear conjugate gradient.
pub const DEFAULT_CG_RESTART_ITERS: u64 = 10;

/// Orthogonality bound that triggers a conjugate-gradient restart.
pub const DEFAULT_CG_RESTART_ORTHOGONALITY: f64 = 0.1;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Polak–Ribière nonlinear CG wired to the Hager–Zhang line search.
pub type CgHagerZhang = NonlinearConjugateGradient<Theta, HagerZhangLS, PolakRibiere, Cost>;

/// Polak–Ribière nonlinear CG wired to the More–Thuente line search.
pub type CgMoreThuente = NonlinearConjugateGradient<Theta, MoreThuenteLS, PolakRibiere, Cost>;
