//! High-level entry point for minimizing an [`Objective`].
//!
//! Selects the backend (L-BFGS or nonlinear CG) and line search from
//! [`SolverOptions`], wraps the objective in an `ArgMinAdapter`, and delegates
//! the run to [`run_solver`].
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        RunOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{
            build_cg_hager_zhang, build_cg_more_thuente, build_lbfgs_hager_zhang,
            build_lbfgs_more_thuente,
        },
        options::SolverOptions,
        run::run_solver,
        traits::{LeastSquaresSolver, LineSearcher, Objective},
        validation::validate_theta,
    },
};

/// Minimize an objective `f(θ)` with the backend selected in `opts`.
///
/// # Behavior
/// - Checks `theta0` against `f.num_parameters()` and for finite entries,
///   then calls `f.check(&theta0)`.
/// - Wraps `f` in an `ArgMinAdapter` using `opts.differentiation`.
/// - Builds L-BFGS or Polak–Ribière CG with the configured line search.
/// - Calls [`run_solver`], which applies thresholds, the iteration budget
///   and optional observers, and returns an [`RunOutcome`].
///
/// # Errors
/// - `ThetaLengthMismatch` / `InvalidThetaInput` for a bad starting point.
/// - Propagates any error from `f.check`.
/// - Propagates runtime errors from [`run_solver`] (objective failures,
///   line search failures, invalid estimates).
///
/// # Example
/// ```
/// use map_super_resolution::optimization::errors::OptResult;
/// use map_super_resolution::optimization::minimizer::{
///     Cost, Objective, SolverOptions, Theta, minimize,
/// };
/// use ndarray::array;
///
/// struct Bowl;
/// impl Objective for Bowl {
///     fn num_parameters(&self) -> usize { 2 }
///     fn cost(&self, theta: &Theta) -> OptResult<Cost> { Ok(theta.dot(theta)) }
///     fn check(&self, _: &Theta) -> OptResult<()> { Ok(()) }
/// }
///
/// let out = minimize(&Bowl, array![1.0, -2.0], &SolverOptions::default(), false)?;
/// assert!(out.cost < 1e-6);
/// # Ok::<(), map_super_resolution::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, opts: &SolverOptions, verbose: bool,
) -> OptResult<RunOutcome> {
    validate_theta(&theta0, f.num_parameters())?;
    f.check(&theta0)?;
    let problem = ArgMinAdapter::new(f, opts.differentiation);
    match (opts.least_squares_solver, opts.line_searcher) {
        (LeastSquaresSolver::Lbfgs, LineSearcher::MoreThuente) => {
            run_solver(theta0, opts, problem, build_lbfgs_more_thuente(opts), verbose)
        }
        (LeastSquaresSolver::Lbfgs, LineSearcher::HagerZhang) => {
            run_solver(theta0, opts, problem, build_lbfgs_hager_zhang(opts), verbose)
        }
        (LeastSquaresSolver::ConjugateGradient, LineSearcher::MoreThuente) => {
            run_solver(theta0, opts, problem, build_cg_more_thuente(), verbose)
        }
        (LeastSquaresSolver::ConjugateGradient, LineSearcher::HagerZhang) => {
            run_solver(theta0, opts, problem, build_cg_hager_zhang(), verbose)
        }
    }
}
