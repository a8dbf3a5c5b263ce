//! Solver options — backend selection, stopping thresholds, diagnostics.
//!
//! Purpose
//! -------
//! Collect every knob the minimizer reads into one validated value: which
//! backend runs, how gradients are obtained, whether channels are solved
//! separately, and the three convergence thresholds that decide when a run
//! is finished.
//!
//! Key behaviors
//! -------------
//! - [`SolverOptions::new`] validates thresholds, the numerical step, the
//!   iteration budget and the L-BFGS memory.
//! - [`SolverOptions::adjust_thresholds_adaptively`] rescales the thresholds
//!   by `num_parameters * regularization_parameter_sum`, only ever upwards.
//! - `Display` renders the fixed-order diagnostic report that
//!   [`SolverOptions::print_solver_options`] writes to stdout.
//!
//! Invariants & assumptions
//! ------------------------
//! - Thresholds are finite and non-negative after construction.
//! - Adaptation multiplies by a factor `>= 1.0` or not at all, so thresholds
//!   never decrease across calls.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the adaptation boundary at `scale == 1.0`, validation
//!   failures, and the presence/order of report lines.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        convergence::{ConvergenceThresholds, StoppingRule},
        traits::{Differentiation, LeastSquaresSolver, LineSearcher},
        validation::{
            verify_cost_threshold, verify_differentiation, verify_gradient_threshold,
            verify_parameter_threshold,
        },
    },
};

/// Iteration budget used when none is given.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Default value for each of the three convergence thresholds.
pub const DEFAULT_THRESHOLD: f64 = 1e-6;

/// Default forward-difference step for numerical differentiation.
pub const DEFAULT_DIFFERENTIATION_STEP: f64 = 1e-6;

/// SolverOptions — configuration read by the backend during a run.
///
/// Fields
/// ------
/// - `least_squares_solver`: backend kind (CG or L-BFGS).
/// - `differentiation`: analytic gradients or forward differences.
/// - `split_channels`: solve each channel as an independent sub-problem.
/// - `gradient_norm_threshold`, `cost_decrease_threshold`,
///   `parameter_variation_threshold`: stopping thresholds.
/// - `stopping_rule`: how the three threshold tests combine.
/// - `max_iterations`: iteration budget per backend run.
/// - `line_searcher`: line search used by either backend.
/// - `lbfgs_mem`: optional L-BFGS history size (default 7).
///
/// Default
/// -------
/// L-BFGS, analytical, no split, thresholds `1e-6`, all thresholds required,
/// 50 iterations, More–Thuente, default memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub least_squares_solver: LeastSquaresSolver,
    pub differentiation: Differentiation,
    pub split_channels: bool,
    pub gradient_norm_threshold: f64,
    pub cost_decrease_threshold: f64,
    pub parameter_variation_threshold: f64,
    pub stopping_rule: StoppingRule,
    pub max_iterations: usize,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl SolverOptions {
    /// Create validated solver options.
    ///
    /// Remaining knobs (`stopping_rule`, `max_iterations`, `line_searcher`,
    /// `lbfgs_mem`) start at their defaults and can be changed through the
    /// `with_*` builders.
    ///
    /// # Errors
    /// - `InvalidGradientThreshold` / `InvalidCostThreshold` /
    ///   `InvalidParameterThreshold` for negative or non-finite thresholds.
    /// - `InvalidDifferentiationStep` for a non-positive or non-finite step.
    pub fn new(
        least_squares_solver: LeastSquaresSolver, differentiation: Differentiation,
        split_channels: bool, thresholds: ConvergenceThresholds,
    ) -> OptResult<Self> {
        verify_differentiation(&differentiation)?;
        verify_gradient_threshold(thresholds.gradient_norm)?;
        verify_cost_threshold(thresholds.cost_decrease)?;
        verify_parameter_threshold(thresholds.parameter_variation)?;
        Ok(Self {
            least_squares_solver,
            differentiation,
            split_channels,
            gradient_norm_threshold: thresholds.gradient_norm,
            cost_decrease_threshold: thresholds.cost_decrease,
            parameter_variation_threshold: thresholds.parameter_variation,
            ..Self::default()
        })
    }

    /// Set the iteration budget.
    ///
    /// # Errors
    /// - `InvalidMaxIter` if `max_iterations == 0`.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> OptResult<Self> {
        if max_iterations == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter: max_iterations,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    /// Set the L-BFGS history size.
    ///
    /// # Errors
    /// - `InvalidLBFGSMem` if `mem == 0`.
    pub fn with_lbfgs_mem(mut self, mem: usize) -> OptResult<Self> {
        if mem == 0 {
            return Err(OptError::InvalidLBFGSMem {
                mem,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        self.lbfgs_mem = Some(mem);
        Ok(self)
    }

    pub fn with_line_searcher(mut self, line_searcher: LineSearcher) -> Self {
        self.line_searcher = line_searcher;
        self
    }

    pub fn with_stopping_rule(mut self, stopping_rule: StoppingRule) -> Self {
        self.stopping_rule = stopping_rule;
        self
    }

    /// Current thresholds as a standalone value for the convergence check.
    pub fn thresholds(&self) -> ConvergenceThresholds {
        ConvergenceThresholds {
            gradient_norm: self.gradient_norm_threshold,
            cost_decrease: self.cost_decrease_threshold,
            parameter_variation: self.parameter_variation_threshold,
        }
    }

    /// Scale the thresholds to the size and regularization strength of the
    /// problem.
    ///
    /// `scale = num_parameters * regularization_parameter_sum`. If
    /// `scale < 1.0` nothing changes; otherwise all three thresholds are
    /// multiplied by `scale`. Thresholds are only scaled up, never down.
    pub fn adjust_thresholds_adaptively(
        &mut self, num_parameters: usize, regularization_parameter_sum: f64,
    ) {
        let threshold_scale = num_parameters as f64 * regularization_parameter_sum;
        // NaN also fails this comparison and is skipped.
        if !(threshold_scale >= 1.0) {
            return;
        }
        self.gradient_norm_threshold *= threshold_scale;
        self.cost_decrease_threshold *= threshold_scale;
        self.parameter_variation_threshold *= threshold_scale;
    }

    /// Write the diagnostic report (see the `Display` impl) to stdout.
    pub fn print_solver_options(&self) {
        print!("{self}");
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            least_squares_solver: LeastSquaresSolver::Lbfgs,
            differentiation: Differentiation::Analytical,
            split_channels: false,
            gradient_norm_threshold: DEFAULT_THRESHOLD,
            cost_decrease_threshold: DEFAULT_THRESHOLD,
            parameter_variation_threshold: DEFAULT_THRESHOLD,
            stopping_rule: StoppingRule::AllThresholds,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

impl std::fmt::Display for SolverOptions {
    /// Fixed-order report: solver and differentiation mode, channel
    /// splitting (only when enabled), then the three thresholds.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  Least squares solver:                {}", self.least_squares_solver.name())?;
        match self.differentiation {
            Differentiation::Numerical { step } => {
                writeln!(f, " (numerical differentiation [step = {step}])")?
            }
            Differentiation::Analytical => writeln!(f, " (analytical differentiation)")?,
        }
        if self.split_channels {
            writeln!(f, "  Channel splitting enabled.")?;
        }
        writeln!(f, "  Threshold 1 (gradient norm):         {}", self.gradient_norm_threshold)?;
        writeln!(f, "  Threshold 2 (cost decrease):         {}", self.cost_decrease_threshold)?;
        writeln!(f, "  Threshold 3 (parameter variation):   {}", self.parameter_variation_threshold)
    }
}
