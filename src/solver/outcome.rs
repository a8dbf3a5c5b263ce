//! Result of a MAP solve.
use crate::{
    image::ImageData,
    optimization::minimizer::{RunOutcome, RunStatus},
};

/// Final HR estimate plus one [`RunOutcome`] per backend run.
///
/// A joint solve has a single run; a channel-split solve has one run per
/// channel, in channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub estimate: ImageData,
    pub runs: Vec<RunOutcome>,
}

impl SolveOutcome {
    /// Aggregate status over all runs.
    ///
    /// The first `Stopped` run wins; otherwise `MaxIterations` if any run ran
    /// out of budget; otherwise `Converged`.
    pub fn status(&self) -> RunStatus {
        if let Some(stopped) =
            self.runs.iter().find(|r| matches!(r.status, RunStatus::Stopped(_)))
        {
            return stopped.status.clone();
        }
        if self.runs.iter().any(|r| r.status == RunStatus::MaxIterations) {
            return RunStatus::MaxIterations;
        }
        RunStatus::Converged
    }

    /// Sum of the final objective values of all runs.
    pub fn total_cost(&self) -> f64 {
        self.runs.iter().map(|r| r.cost).sum()
    }

    pub fn total_iterations(&self) -> u64 {
        self.runs.iter().map(|r| r.iterations).sum()
    }
}
