//! Runs one argmin solver over an [`Objective`] and packages the result.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        Grad, Objective, RunOutcome, SolverOptions, Theta, adapter::ArgMinAdapter,
        convergence::Thresholded,
    },
};
use argmin::core::{Executor, IterState, Solver, State};
use argmin_math::ArgminL2Norm;
use tracing::debug;

type MinimizerState = IterState<Theta, Grad, (), (), (), f64>;

/// Shared runner behind every backend/line-search pairing.
///
/// The solver is wrapped in [`Thresholded`] so that `opts`' thresholds and
/// stopping rule decide convergence; the executor starts from `theta0` with
/// a budget of `opts.max_iterations`.
///
/// When `verbose`, the starting cost and gradient norm are logged at debug
/// level, and with the `obs_slog` feature argmin's terminal observer reports
/// every iteration.
///
/// A backend failure after the first completed iteration does not fail the
/// run; it comes back as [`RunStatus::Stopped`](crate::optimization::minimizer::RunStatus)
/// with the best iterate.
///
/// # Errors
/// - Objective failures raised inside argmin, and backend failures on the
///   first step, recovered through `From<argmin::core::Error>`.
/// - Outcome validation errors (missing or non-finite estimate, non-finite
///   best cost).
pub fn run_solver<'a, F, S>(
    theta0: Theta, opts: &SolverOptions, problem: ArgMinAdapter<'a, F>, solver: S, verbose: bool,
) -> OptResult<RunOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, MinimizerState> + Send + 'static,
{
    if verbose {
        log_starting_point(&theta0, &problem);
    }

    let solver = Thresholded::new(solver, opts.thresholds(), opts.stopping_rule);
    let max_iters = opts.max_iterations as u64;
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(theta0).max_iters(max_iters));
    #[cfg(feature = "obs_slog")]
    if verbose {
        executor = executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        );
    }

    let result = executor.run()?;
    let best_grad_norm = result.solver.best_grad_norm();
    into_outcome(result.state, best_grad_norm)
}

fn into_outcome(mut state: MinimizerState, best_grad_norm: Option<f64>) -> OptResult<RunOutcome> {
    let termination = state.get_termination_status().clone();
    RunOutcome::new(
        state.take_best_param(),
        state.get_best_cost(),
        &termination,
        state.get_iter(),
        state.get_func_counts().clone(),
        best_grad_norm,
    )
}

fn log_starting_point<F: Objective>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) {
    // Evaluation failures here are reported by the run itself.
    let cost = problem.evaluate(theta0).ok();
    let grad_norm = problem.evaluate_gradient(theta0).ok().map(|g| g.l2_norm());
    debug!(parameters = theta0.len(), ?cost, ?grad_norm, "starting point");
}
