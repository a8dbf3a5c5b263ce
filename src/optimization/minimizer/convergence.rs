//! minimizer::convergence — threshold-based stopping for argmin solvers.
//!
//! Purpose
//! -------
//! Decide when a backend run is finished from three quantities observed
//! after each iteration: the gradient norm, the change in cost, and the
//! Euclidean length of the parameter step.
//!
//! Key behaviors
//! -------------
//! - [`ConvergenceThresholds`] holds the three thresholds and evaluates
//!   them under a [`StoppingRule`].
//! - [`Thresholded`] wraps any argmin [`Solver`] over the crate's
//!   `IterState` and reports `SolverConverged` once the thresholds are met.
//!   Initialization, iterations and the inner solver's own termination are
//!   otherwise delegated unchanged.
//! - The wrapper keeps its own copy of the iterate and cost before each
//!   step. argmin's quasi-Newton and CG solvers move the parameter vector
//!   out of the state, so `IterState::get_prev_param` is not usable.
//! - A backend failure (line search, non-finite proposal) after at least one
//!   completed iteration ends the run as `SolverExit` with the best iterate
//!   kept. Errors raised by the objective itself still propagate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Threshold tests only run after at least one completed iteration, so the
//!   starting point is never declared converged by them.
//! - A gradient norm below [`STATIONARY_GRAD_NORM`] (argmin's L-BFGS default
//!   gradient tolerance, `√ε`) stops the run at any iteration, including the
//!   first, for both backends. A non-finite norm stops it as `SolverExit`.
//! - A quantity that is unavailable (no gradient stored, no previous cost or
//!   parameter) never satisfies its test.
//!
//! Testing notes
//! -------------
//! - Unit tests drive `is_satisfied` directly for both rules and run the
//!   wrapper through argmin's `Executor` around a scripted inner solver.
use crate::optimization::{
    errors::OptError,
    minimizer::{Grad, Theta},
};
use argmin::core::{
    Error, IterState, KV, Problem, Solver, State, TerminationReason, TerminationStatus,
};
use argmin_math::ArgminL2Norm;
use tracing::warn;

/// Gradient norm below which an iterate counts as stationary, whatever the
/// configured thresholds.
pub const STATIONARY_GRAD_NORM: f64 = 1.490_116_119_384_765_6e-8;

/// How the three threshold tests combine.
///
/// - `AllThresholds`: every test must pass (default).
/// - `AnyThreshold`: one passing test is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoppingRule {
    #[default]
    AllThresholds,
    AnyThreshold,
}

/// Gradient-norm, cost-decrease and parameter-variation thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceThresholds {
    pub gradient_norm: f64,
    pub cost_decrease: f64,
    pub parameter_variation: f64,
}

impl ConvergenceThresholds {
    pub fn new(gradient_norm: f64, cost_decrease: f64, parameter_variation: f64) -> Self {
        Self { gradient_norm, cost_decrease, parameter_variation }
    }

    /// Evaluate the threshold tests for one iteration.
    ///
    /// Parameters
    /// ----------
    /// - `rule`: combination rule.
    /// - `grad_norm`: `‖∇f(x_k)‖₂`, if a gradient is available.
    /// - `cost_change`: `|f(x_k) − f(x_{k−1})|`, if both costs are known.
    /// - `param_change`: `‖x_k − x_{k−1}‖₂`, if both iterates are known.
    ///
    /// Returns
    /// -------
    /// `true` when the tests pass under `rule`. Missing or non-finite
    /// quantities count as failed tests.
    pub fn is_satisfied(
        &self, rule: StoppingRule, grad_norm: Option<f64>, cost_change: Option<f64>,
        param_change: Option<f64>,
    ) -> bool {
        let passes = |value: Option<f64>, threshold: f64| {
            value.is_some_and(|v| v.is_finite() && v <= threshold)
        };
        let tests = [
            passes(grad_norm, self.gradient_norm),
            passes(cost_change, self.cost_decrease),
            passes(param_change, self.parameter_variation),
        ];
        match rule {
            StoppingRule::AllThresholds => tests.iter().all(|&t| t),
            StoppingRule::AnyThreshold => tests.iter().any(|&t| t),
        }
    }
}

/// Thresholded — argmin solver wrapper adding threshold-based stopping.
///
/// The inner solver keeps its own termination criteria; this wrapper only
/// adds more ways to finish. It also records the gradient norm of the best
/// iterate it has seen, read back through [`Thresholded::best_grad_norm`].
#[derive(Debug, Clone)]
pub struct Thresholded<S> {
    inner: S,
    thresholds: ConvergenceThresholds,
    rule: StoppingRule,
    previous: Option<(Theta, f64)>,
    best_grad_norm: Option<f64>,
}

impl<S> Thresholded<S> {
    pub fn new(inner: S, thresholds: ConvergenceThresholds, rule: StoppingRule) -> Self {
        Self { inner, thresholds, rule, previous: None, best_grad_norm: None }
    }

    /// Gradient norm at the best iterate, when that iterate carried a
    /// gradient.
    pub fn best_grad_norm(&self) -> Option<f64> {
        self.best_grad_norm
    }

    fn cost_change(&self, cost: f64) -> Option<f64> {
        let (_, prev_cost) = self.previous.as_ref()?;
        (cost.is_finite() && prev_cost.is_finite()).then(|| (cost - prev_cost).abs())
    }

    fn param_change(&self, param: Option<&Theta>) -> Option<f64> {
        let (prev, _) = self.previous.as_ref()?;
        param.map(|x| (x - prev).l2_norm())
    }
}

/// Objective errors reach argmin as [`OptError`]. Anything else, and a
/// non-finite parameter vector proposed by the backend, is the backend's.
fn is_backend_failure(err: &Error) -> bool {
    match err.downcast_ref::<OptError>() {
        Some(OptError::InvalidThetaInput { .. }) | None => true,
        Some(_) => false,
    }
}

type MinimizerState = IterState<Theta, Grad, (), (), (), f64>;

impl<O, S> Solver<O, MinimizerState> for Thresholded<S>
where
    S: Solver<O, MinimizerState>,
{
    const NAME: &'static str = S::NAME;

    fn init(
        &mut self, problem: &mut Problem<O>, state: MinimizerState,
    ) -> Result<(MinimizerState, Option<KV>), Error> {
        self.previous = None;
        self.best_grad_norm = None;
        self.inner.init(problem, state)
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: MinimizerState,
    ) -> Result<(MinimizerState, Option<KV>), Error> {
        let mut before = state.clone();
        let completed = state.get_iter();
        match self.inner.next_iter(problem, state) {
            Ok(step) => {
                let cost = before.get_cost();
                self.previous = before.take_param().map(|param| (param, cost));
                Ok(step)
            }
            Err(err) if completed > 0 && is_backend_failure(&err) => {
                warn!(
                    iteration = completed,
                    error = %err,
                    "backend step failed, keeping best iterate"
                );
                Ok((before.terminate_with(TerminationReason::SolverExit(err.to_string())), None))
            }
            Err(err) => Err(err),
        }
    }

    fn terminate(&mut self, state: &MinimizerState) -> TerminationStatus {
        let grad_norm = state.get_gradient().map(|g| g.l2_norm());
        if state.get_param().is_some() && state.get_param() == state.get_best_param() {
            self.best_grad_norm = grad_norm;
        }
        match grad_norm {
            Some(norm) if norm < STATIONARY_GRAD_NORM => {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
            Some(norm) if !norm.is_finite() => {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(format!(
                    "gradient norm is {norm}"
                )));
            }
            _ => {}
        }

        let inner_status = self.inner.terminate(state);
        if inner_status.terminated() {
            return inner_status;
        }
        if state.get_iter() == 0 {
            return TerminationStatus::NotTerminated;
        }

        let cost_change = self.cost_change(state.get_cost());
        let param_change = self.param_change(state.get_param());
        if self.thresholds.is_satisfied(self.rule, grad_norm, cost_change, param_change) {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}
