//! solver — super-resolution solvers over the minimizer.
//!
//! Purpose
//! -------
//! Define what a super-resolution solver exposes ([`Solver`]) and provide
//! the MAP implementation ([`MapSolver`]): data fidelity against every
//! observation plus a weighted sum of priors, minimized jointly or one
//! channel at a time.
//!
//! Downstream usage
//! ----------------
//! - Build a [`MapSolver`] from an image model and LR frames, add
//!   regularizers, then call [`Solver::solve`] with an initial HR estimate
//!   and [`SolverOptions`](crate::optimization::minimizer::SolverOptions).
//! - Callers running their own backend can use
//!   [`Solver::evaluate_cost`] / [`Solver::evaluate_gradient`] directly.

pub mod errors;
pub mod map_solver;
pub(crate) mod objective;
pub mod outcome;

pub use self::errors::{SolverError, SolverResult};
pub use self::map_solver::{MAX_DATA_POINTS, MapSolver, data_point_count};
pub use self::outcome::SolveOutcome;

use crate::{
    image::{ImageData, ImageSize},
    optimization::minimizer::{Grad, SolverOptions, Theta},
};

/// Capability shared by super-resolution solvers.
///
/// Parameter vectors are channel-major flattenings of HR images (see
/// [`ImageData::to_theta`]).
pub trait Solver {
    fn num_channels(&self) -> usize;

    fn image_size(&self) -> ImageSize;

    /// Number of scalar unknowns, `pixels * channels`.
    fn num_data_points(&self) -> usize;

    fn num_pixels(&self) -> usize {
        self.image_size().area()
    }

    /// Objective value of the whole problem at `estimate`.
    fn evaluate_cost(&self, estimate: &Theta) -> SolverResult<f64>;

    /// Analytic gradient of the whole problem at `estimate`.
    fn evaluate_gradient(&self, estimate: &Theta) -> SolverResult<Grad>;

    /// Minimize starting from `initial_estimate`.
    fn solve(
        &self, initial_estimate: &ImageData, options: &SolverOptions,
    ) -> SolverResult<SolveOutcome>;
}
