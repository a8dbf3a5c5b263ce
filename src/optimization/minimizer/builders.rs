//! minimizer::builders — backend solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the L-BFGS and nonlinear
//! conjugate-gradient solvers used by the minimizer. These helpers hide
//! argmin's generic wiring and apply crate-level options (memory size, CG
//! restart policy) so that higher-level code can request a configured solver
//! without touching argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct L-BFGS solvers with either Hager–Zhang or More–Thuente line
//!   search.
//! - Construct Polak–Ribière nonlinear CG with either line search and the
//!   crate's restart policy.
//!
//! Invariants & assumptions
//! ------------------------
//! - The L-BFGS memory (`m`) is either provided via `opts.lbfgs_mem` or
//!   defaults to [`DEFAULT_LBFGS_MEM`].
//! - Stopping thresholds are not wired into the solvers; they are enforced by
//!   [`Thresholded`](crate::optimization::minimizer::convergence::Thresholded)
//!   so that both backends share one stopping rule.
//!
//! Conventions
//! -----------
//! - The builders do **not** set an initial parameter vector or `max_iters`;
//!   these are applied by the runner.
//!
//! Testing notes
//! -------------
//! - Unit tests only check that the builders honor `lbfgs_mem`; full solves
//!   run in the minimizer and integration tests.
use argmin::solver::conjugategradient::beta::PolakRibiere;

use crate::optimization::minimizer::{
    options::SolverOptions,
    types::{
        CgHagerZhang, CgMoreThuente, DEFAULT_CG_RESTART_ITERS, DEFAULT_CG_RESTART_ORTHOGONALITY,
        DEFAULT_LBFGS_MEM, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS,
    },
};

/// build_lbfgs_hager_zhang — L-BFGS with Hager–Zhang line search.
///
/// Consults `opts.lbfgs_mem`; `None` selects [`DEFAULT_LBFGS_MEM`].
pub fn build_lbfgs_hager_zhang(opts: &SolverOptions) -> LbfgsHagerZhang {
    LbfgsHagerZhang::new(HagerZhangLS::new(), lbfgs_memory(opts))
}

/// build_lbfgs_more_thuente — L-BFGS with More–Thuente line search.
///
/// Consults `opts.lbfgs_mem`; `None` selects [`DEFAULT_LBFGS_MEM`].
pub fn build_lbfgs_more_thuente(opts: &SolverOptions) -> LbfgsMoreThuente {
    LbfgsMoreThuente::new(MoreThuenteLS::new(), lbfgs_memory(opts))
}

/// build_cg_hager_zhang — Polak–Ribière nonlinear CG with Hager–Zhang line
/// search.
///
/// Notes
/// -----
/// - The search direction is reset to steepest descent every
///   [`DEFAULT_CG_RESTART_ITERS`] iterations, and whenever consecutive
///   gradients lose orthogonality beyond
///   [`DEFAULT_CG_RESTART_ORTHOGONALITY`].
pub fn build_cg_hager_zhang() -> CgHagerZhang {
    CgHagerZhang::new(HagerZhangLS::new(), PolakRibiere::new())
        .restart_iters(DEFAULT_CG_RESTART_ITERS)
        .restart_orthogonality(DEFAULT_CG_RESTART_ORTHOGONALITY)
}

/// build_cg_more_thuente — Polak–Ribière nonlinear CG with More–Thuente line
/// search. Same restart policy as [`build_cg_hager_zhang`].
pub fn build_cg_more_thuente() -> CgMoreThuente {
    CgMoreThuente::new(MoreThuenteLS::new(), PolakRibiere::new())
        .restart_iters(DEFAULT_CG_RESTART_ITERS)
        .restart_orthogonality(DEFAULT_CG_RESTART_ORTHOGONALITY)
}

fn lbfgs_memory(opts: &SolverOptions) -> usize {
    opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The L-BFGS memory falls back to the crate default and otherwise honors
    // the configured value.
    //
    // Given
    // -----
    // - Default options (no memory set).
    // - Options with `lbfgs_mem = 11`.
    //
    // Expect
    // ------
    // - `lbfgs_memory` returns `DEFAULT_LBFGS_MEM` and `11` respectively.
    fn lbfgs_memory_defaults_and_overrides() {
        let default_opts = SolverOptions::default();
        let custom = SolverOptions::default().with_lbfgs_mem(11).unwrap();

        assert_eq!(lbfgs_memory(&default_opts), DEFAULT_LBFGS_MEM);
        assert_eq!(lbfgs_memory(&custom), 11);
    }
}
