//! Integration tests for the MAP super-resolution pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path: LR frames → `MapSolver` construction →
//!   regularizer registration → threshold adaptation → argmin backend →
//!   assembled HR estimate.
//! - Exercise both backends, both differentiation modes and channel
//!   splitting on small synthetic scenes with a known answer.
//!
//! Coverage
//! --------
//! - `solver::MapSolver`: joint and per-channel solves, public evaluation.
//! - `regularization`: Tikhonov and total variation priors, duplicate
//!   bindings.
//! - `optimization::minimizer`: L-BFGS and nonlinear CG via
//!   `SolverOptions`, numerical differentiation, failure propagation.
//!
//! Exclusions
//! ----------
//! - Construction edge cases, resampling details and option validation are
//!   covered by unit tests.
use map_super_resolution::{
    image::{ImageData, ImageSize},
    model::{BlockDownsamplingModel, ImageModel, ModelResult},
    optimization::{
        errors::OptError,
        minimizer::{
            ConvergenceThresholds, Differentiation, LeastSquaresSolver, LineSearcher, RunStatus,
            SolverOptions, StoppingRule,
        },
    },
    regularization::{Regularizer, TikhonovRegularizer, TotalVariationRegularizer},
    solver::{MapSolver, Solver, SolverError},
};
use ndarray::{Array3, Axis, s};
use std::sync::Arc;

const SCALE: usize = 2;

/// Purpose
/// -------
/// Smooth, non-constant HR scene of size `width x height` with `channels`
/// channels.
fn ground_truth(width: usize, height: usize, channels: usize) -> ImageData {
    let pixels = Array3::from_shape_fn((channels, height, width), |(c, i, j)| {
        0.5 + 0.3 * ((i as f64 * 0.6 + c as f64).sin() * (j as f64 * 0.4).cos())
    });
    ImageData::new(pixels).expect("ground truth should be a valid image")
}

/// Purpose
/// -------
/// Average every `SCALE x SCALE` block, producing the LR image on the LR
/// lattice.
///
/// Returns
/// -------
/// - An image of size `(width / SCALE, height / SCALE)`.
fn block_means(image: &ImageData) -> ImageData {
    let size = image.size();
    let (lr_w, lr_h) = (size.width / SCALE, size.height / SCALE);
    let mut out = Array3::zeros((image.num_channels(), lr_h, lr_w));
    for (c, plane) in image.pixels().axis_iter(Axis(0)).enumerate() {
        for i in 0..lr_h {
            for j in 0..lr_w {
                let block = plane.slice(s![i * SCALE..(i + 1) * SCALE, j * SCALE..(j + 1) * SCALE]);
                out[[c, i, j]] = block.mean().unwrap_or(0.0);
            }
        }
    }
    ImageData::new(out).expect("block means should be a valid image")
}

/// Purpose
/// -------
/// Two LR frames that bracket the true LR image by a symmetric `±0.01`
/// checkerboard, so the least-squares fit of both is the true LR image.
fn bracketing_frames(truth: &ImageData) -> (ImageData, Vec<ImageData>) {
    let lr = block_means(truth);
    let pattern = Array3::from_shape_fn(lr.pixels().dim(), |(_, i, j)| {
        if (i + j) % 2 == 0 { 0.01 } else { -0.01 }
    });
    let up = ImageData::new(lr.pixels() + &pattern).unwrap();
    let down = ImageData::new(lr.pixels() - &pattern).unwrap();
    (lr, vec![up, down])
}

fn assert_block_means_close(estimate: &ImageData, lr: &ImageData, tol: f64) {
    let got = block_means(estimate);
    for (a, b) in got.pixels().iter().zip(lr.pixels().iter()) {
        assert!((a - b).abs() <= tol, "block mean {a} differs from LR value {b} by more than {tol}");
    }
}

fn options(
    solver: LeastSquaresSolver, differentiation: Differentiation, split: bool,
) -> SolverOptions {
    SolverOptions::new(
        solver,
        differentiation,
        split,
        ConvergenceThresholds::new(1e-6, 1e-9, 1e-6),
    )
    .expect("options should be valid")
    .with_max_iterations(200)
    .expect("iteration budget should be valid")
}

#[test]
// Purpose
// -------
// A joint L-BFGS solve without priors reproduces the LR observations.
//
// Given
// -----
// - 8x8 two-channel ground truth, two bracketing 4x4 frames, factor 2.
// - Zero initial estimate, analytical gradients.
//
// Expect
// ------
// - The run finishes with `Converged`.
// - The final cost is below the initial cost.
// - Block means of the estimate match the LR image within `1e-3`.
fn lbfgs_joint_solve_reproduces_block_means() {
    let truth = ground_truth(8, 8, 2);
    let (lr, frames) = bracketing_frames(&truth);
    let model = BlockDownsamplingModel::new(SCALE).unwrap();
    let solver = MapSolver::new(&model, &frames, false).unwrap();
    let initial = ImageData::zeros(solver.image_size(), solver.num_channels()).unwrap();
    let initial_cost = solver.evaluate_cost(&initial.to_theta()).unwrap();

    let outcome = solver
        .solve(&initial, &options(LeastSquaresSolver::Lbfgs, Differentiation::Analytical, false))
        .expect("L-BFGS solve should succeed");

    assert_eq!(outcome.runs.len(), 1);
    assert_eq!(outcome.status(), RunStatus::Converged);
    assert!(outcome.total_cost() < initial_cost);
    assert_eq!(outcome.estimate.size(), ImageSize::new(8, 8));
    assert_block_means_close(&outcome.estimate, &lr, 1e-3);
}

#[test]
// Purpose
// -------
// Nonlinear CG under the default all-thresholds rule converges on the MAP
// problem with either line search. The data term has a single non-zero
// curvature, so CG lands on the optimum early and the next step starts
// from a stationary point.
//
// Given
// -----
// - 8x8 two-channel scene, two bracketing frames, factor 2, no priors.
// - Zero initial estimate, default stopping rule, thresholds
//   `(1e-6, 1e-9, 1e-6)`.
//
// Expect
// ------
// - `Converged` for More–Thuente and Hager–Zhang, never an error.
// - Block means within `1e-3` of the LR image.
fn conjugate_gradient_converges_under_default_rule() {
    let truth = ground_truth(8, 8, 2);
    let (lr, frames) = bracketing_frames(&truth);
    let model = BlockDownsamplingModel::new(SCALE).unwrap();
    let solver = MapSolver::new(&model, &frames, false).unwrap();
    let initial = ImageData::zeros(solver.image_size(), solver.num_channels()).unwrap();

    for line_searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
        let opts =
            options(LeastSquaresSolver::ConjugateGradient, Differentiation::Analytical, false)
                .with_line_searcher(line_searcher);
        assert_eq!(opts.stopping_rule, StoppingRule::AllThresholds);

        let outcome = solver
            .solve(&initial, &opts)
            .unwrap_or_else(|e| panic!("CG with {line_searcher:?} failed: {e}"));

        assert_eq!(outcome.status(), RunStatus::Converged, "{line_searcher:?}");
        assert_block_means_close(&outcome.estimate, &lr, 1e-3);
    }
}

#[test]
// Purpose
// -------
// Nonlinear CG with priors (one handle bound twice) still fits the data.
//
// Given
// -----
// - Same scene as above plus Tikhonov (weights 5e-4 and 5e-4 on one shared
//   handle) and total variation (1e-4).
// - Any-threshold stopping with a gradient threshold of `1e-5`.
//
// Expect
// ------
// - The solve succeeds and lowers the cost.
// - Block means stay within `2e-2` of the LR image.
fn conjugate_gradient_with_priors_fits_data() {
    let truth = ground_truth(8, 8, 2);
    let (lr, frames) = bracketing_frames(&truth);
    let model = BlockDownsamplingModel::new(SCALE).unwrap();
    let mut solver = MapSolver::new(&model, &frames, false).unwrap();
    let tikhonov: Arc<dyn Regularizer> = Arc::new(TikhonovRegularizer);
    solver.add_regularizer(Arc::clone(&tikhonov), 5e-4).unwrap();
    solver.add_regularizer(tikhonov, 5e-4).unwrap();
    solver.add_regularizer(Arc::new(TotalVariationRegularizer::default()), 1e-4).unwrap();
    assert!((solver.regularization_parameter_sum() - 1.1e-3).abs() < 1e-15);

    let initial = ImageData::filled(solver.image_size(), solver.num_channels(), 0.5).unwrap();
    let initial_cost = solver.evaluate_cost(&initial.to_theta()).unwrap();
    let opts = SolverOptions::new(
        LeastSquaresSolver::ConjugateGradient,
        Differentiation::Analytical,
        false,
        ConvergenceThresholds::new(1e-5, 1e-12, 1e-8),
    )
    .unwrap()
    .with_stopping_rule(StoppingRule::AnyThreshold)
    .with_max_iterations(300)
    .unwrap();

    let outcome = solver.solve(&initial, &opts).expect("CG solve should succeed");

    assert!(outcome.total_cost() < initial_cost);
    assert_block_means_close(&outcome.estimate, &lr, 2e-2);
}

#[test]
// Purpose
// -------
// Channel splitting runs one backend per channel and reassembles the
// estimate in channel order.
//
// Given
// -----
// - 6x6 three-channel scene, factor 2, L-BFGS, split enabled, verbose on.
//
// Expect
// ------
// - Three runs, each over 36 parameters.
// - The estimate has three channels and matches the LR block means.
fn channel_split_solves_each_channel() {
    let truth = ground_truth(6, 6, 3);
    let (lr, frames) = bracketing_frames(&truth);
    let model = BlockDownsamplingModel::new(SCALE).unwrap();
    let solver = MapSolver::new(&model, &frames, true).unwrap();
    let initial = ImageData::zeros(solver.image_size(), 3).unwrap();

    let outcome = solver
        .solve(&initial, &options(LeastSquaresSolver::Lbfgs, Differentiation::Analytical, true))
        .expect("split solve should succeed");

    assert_eq!(outcome.runs.len(), 3);
    assert!(outcome.runs.iter().all(|r| r.estimate.len() == 36));
    assert_eq!(outcome.estimate.num_channels(), 3);
    assert_block_means_close(&outcome.estimate, &lr, 1e-3);
}

#[test]
// Purpose
// -------
// Numerical differentiation reaches the same fit as analytic gradients on
// a small problem.
//
// Given
// -----
// - 4x4 single-channel scene, factor 2, forward differences with step 1e-7.
//
// Expect
// ------
// - Block means within `1e-3` of the LR image.
fn numerical_differentiation_matches_analytic_fit() {
    let truth = ground_truth(4, 4, 1);
    let (lr, frames) = bracketing_frames(&truth);
    let model = BlockDownsamplingModel::new(SCALE).unwrap();
    let solver = MapSolver::new(&model, &frames, false).unwrap();
    let initial = ImageData::zeros(solver.image_size(), 1).unwrap();

    let outcome = solver
        .solve(
            &initial,
            &options(LeastSquaresSolver::Lbfgs, Differentiation::Numerical { step: 1e-7 }, false),
        )
        .expect("numerical solve should succeed");

    assert_block_means_close(&outcome.estimate, &lr, 1e-3);
}

/// Model whose forward operator produces `NaN` everywhere.
struct PoisonedModel;

impl ImageModel for PoisonedModel {
    fn downsampling_scale(&self) -> usize {
        SCALE
    }

    fn apply_to_image(&self, image: &ImageData, _index: usize) -> ModelResult<ImageData> {
        Ok(ImageData::new(image.pixels().mapv(|_| f64::NAN))?)
    }

    fn apply_transpose_to_image(&self, image: &ImageData, _index: usize) -> ModelResult<ImageData> {
        Ok(image.clone())
    }
}

#[test]
// Purpose
// -------
// A non-finite objective surfaces as an error rather than a status.
//
// Given
// -----
// - A model that outputs `NaN`.
//
// Expect
// ------
// - `evaluate_cost` and `solve` both fail with `NonFiniteCost`.
fn non_finite_cost_surfaces_as_error() {
    let truth = ground_truth(4, 4, 1);
    let (_, frames) = bracketing_frames(&truth);
    let solver = MapSolver::new(&PoisonedModel, &frames, false).unwrap();
    let initial = ImageData::zeros(solver.image_size(), 1).unwrap();

    let direct = solver.evaluate_cost(&initial.to_theta());
    let solved = solver.solve(&initial, &SolverOptions::default());

    assert!(matches!(direct, Err(SolverError::Optimization(OptError::NonFiniteCost { .. }))));
    assert!(
        matches!(solved, Err(SolverError::Optimization(OptError::NonFiniteCost { .. }))),
        "got {:?}",
        solved.err()
    );
}
