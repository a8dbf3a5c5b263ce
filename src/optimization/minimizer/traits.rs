//! Public API surface for objective minimization.
//!
//! - [`Objective`]: trait implemented by anything the minimizer can drive.
//! - [`LeastSquaresSolver`], [`LineSearcher`], [`Differentiation`]: the
//!   enumerated backend choices carried by
//!   [`SolverOptions`](crate::optimization::minimizer::options::SolverOptions).
//! - [`RunStatus`] and [`RunOutcome`]: normalized result of one backend run.
//!
//! Convention: the objective is minimized as given. If an analytic gradient is
//! provided it is the gradient of that same cost.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use std::str::FromStr;

/// Cost/gradient capability consumed by the minimizer.
///
/// `num_parameters` fixes the length of every `Theta` passed in. `check`
/// runs once on the starting point before the backend starts; `cost` and
/// `gradient` may then be called any number of times, in any order, through
/// `&self`. Leaving `gradient` at its default switches the minimizer to
/// central differences.
pub trait Objective {
    fn num_parameters(&self) -> usize;
    fn cost(&self, theta: &Theta) -> OptResult<Cost>;
    fn check(&self, theta: &Theta) -> OptResult<()>;

    fn gradient(&self, _theta: &Theta) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Iterative backend used to minimize the objective.
///
/// Parsing accepts (case-insensitively) `"cg"`, `"conjugate_gradient"`,
/// `"conjugate gradient"` and `"lbfgs"`, `"l-bfgs"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeastSquaresSolver {
    ConjugateGradient,
    #[default]
    Lbfgs,
}

impl LeastSquaresSolver {
    /// Human-readable name used in diagnostic reports.
    pub fn name(&self) -> &'static str {
        match self {
            LeastSquaresSolver::ConjugateGradient => "conjugate gradient",
            LeastSquaresSolver::Lbfgs => "LBFGS",
        }
    }
}

impl FromStr for LeastSquaresSolver {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cg" | "conjugate_gradient" | "conjugate gradient" => {
                Ok(LeastSquaresSolver::ConjugateGradient)
            }
            "lbfgs" | "l-bfgs" => Ok(LeastSquaresSolver::Lbfgs),
            _ => Err(OptError::InvalidSolverKind {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'cg' or 'lbfgs'.",
            }),
        }
    }
}

/// Line search run inside either backend.
///
/// Names parse case-insensitively, ignoring `-`, `_` and spaces, so
/// `"More-Thuente"` and `"hager_zhang"` are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String =
            s.chars().filter(|c| !matches!(c, '-' | '_' | ' ')).collect::<String>().to_lowercase();
        match key.as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Expected 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// How gradients are obtained.
///
/// - `Analytical`: call [`Objective::gradient`]; objectives (or parts of
///   them) without one fall back to central differences.
/// - `Numerical { step }`: forward differences of the cost with the given
///   step, ignoring any analytic gradient.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Differentiation {
    #[default]
    Analytical,
    Numerical {
        step: f64,
    },
}

/// Terminal state of one backend run.
///
/// - `Converged`: the thresholds (or the backend's own criterion) were met.
/// - `MaxIterations`: the iteration budget ran out; the best estimate is
///   still a valid result.
/// - `Stopped(reason)`: any other backend termination, with argmin's reason.
///
/// Numerical failures are not a status; they surface as `Err(OptError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Converged,
    MaxIterations,
    Stopped(String),
}

impl From<&TerminationStatus> for RunStatus {
    fn from(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::NotTerminated => RunStatus::Stopped("Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => match reason {
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached => {
                    RunStatus::Converged
                }
                TerminationReason::MaxItersReached => RunStatus::MaxIterations,
                TerminationReason::SolverExit(text) => RunStatus::Stopped(text.clone()),
                other => RunStatus::Stopped(format!("{other:?}")),
            },
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Converged => write!(f, "converged"),
            RunStatus::MaxIterations => write!(f, "maximum iterations reached"),
            RunStatus::Stopped(reason) => write!(f, "stopped: {reason}"),
        }
    }
}

/// What one backend run produced.
///
/// `estimate` and `cost` are argmin's best iterate and its objective value,
/// and `grad_norm` is the gradient norm at that same iterate when the backend
/// computed one there. `evaluations` holds argmin's counters (`cost_count`,
/// `gradient_count`).
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub estimate: Theta,
    pub cost: Cost,
    pub status: RunStatus,
    pub iterations: u64,
    pub evaluations: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl RunOutcome {
    /// Assemble an outcome from the final backend state.
    ///
    /// # Errors
    /// - `MissingThetaHat` / `InvalidThetaHat` if the best iterate is absent
    ///   or not finite.
    /// - `NonFiniteCost` if its cost is not finite.
    pub fn new(
        best: Option<Theta>, cost: Cost, termination: &TerminationStatus, iterations: u64,
        evaluations: FnEvalMap, grad_norm: Option<f64>,
    ) -> OptResult<Self> {
        let estimate = validate_theta_hat(best)?;
        validate_value(cost)?;
        Ok(Self {
            estimate,
            cost,
            status: termination.into(),
            iterations,
            evaluations,
            grad_norm,
        })
    }

    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }
}
