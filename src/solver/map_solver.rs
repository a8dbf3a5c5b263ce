//! MapSolver — Maximum-A-Posteriori super-resolution solver.
//!
//! Purpose
//! -------
//! Own the HR-resampled observations and the regularizer registry of one
//! super-resolution problem, and hand the resulting MAP objective to the
//! minimizer, jointly or one channel at a time.
//!
//! Key behaviors
//! -------------
//! - Construction validates the frame set (non-empty, equal channel counts,
//!   equal sizes), derives the HR size from the model's upsampling factor,
//!   checks the data-point budget, and only then resamples every frame onto
//!   the HR lattice with nearest-neighbour interpolation.
//! - [`MapSolver::add_regularizer`] appends weighted priors; duplicates are
//!   allowed.
//! - [`Solver::solve`] adapts the convergence thresholds to each
//!   sub-problem before running the backend.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations are stored in input order and never change after
//!   construction.
//! - `num_data_points() <= MAX_DATA_POINTS` for every constructed instance.
//! - The model is borrowed for the solver's lifetime and queried through
//!   `&self` only.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every construction failure, size derivation,
//!   observation order and the data-point boundary. End-to-end solves live
//!   in `tests/`.
use crate::{
    image::{ImageData, ImageSize, InterpolationMode},
    model::ImageModel,
    optimization::{
        errors::OptError,
        minimizer::{
            Grad, Objective, RunOutcome, RunStatus, SolverOptions, Theta, minimize,
            validation::validate_grad,
        },
    },
    regularization::{Regularizer, RegularizerRegistry},
    solver::{
        Solver,
        errors::{SolverError, SolverResult},
        objective::MapObjective,
        outcome::SolveOutcome,
    },
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest supported `pixels * channels`.
pub const MAX_DATA_POINTS: usize = i32::MAX as usize;

/// Number of scalar unknowns for an image of `size` with `channels`
/// channels.
///
/// Errors
/// ------
/// - [`SolverError::DataPointOverflow`] if the product overflows `usize` or
///   exceeds [`MAX_DATA_POINTS`].
pub fn data_point_count(size: ImageSize, channels: usize) -> SolverResult<usize> {
    size.checked_area()
        .and_then(|area| area.checked_mul(channels))
        .filter(|&count| count <= MAX_DATA_POINTS)
        .ok_or(SolverError::DataPointOverflow {
            width: size.width,
            height: size.height,
            channels,
            max: MAX_DATA_POINTS,
        })
}

pub struct MapSolver<'m, M: ImageModel + ?Sized> {
    model: &'m M,
    observations: Vec<ImageData>,
    regularizers: RegularizerRegistry,
    num_channels: usize,
    image_size: ImageSize,
    num_data_points: usize,
    verbose: bool,
}

impl<'m, M: ImageModel + ?Sized> MapSolver<'m, M> {
    /// Build a solver from a model and a non-empty, ordered set of LR frames.
    ///
    /// Parameters
    /// ----------
    /// - `model`: image-formation model; its `downsampling_scale()` is the
    ///   LR → HR upsampling factor.
    /// - `low_res_images`: observed frames. All must share the channel count
    ///   and size of the first one.
    /// - `verbose`: log construction and solve progress through `tracing`,
    ///   and print the solver options before each run.
    ///
    /// Errors
    /// ------
    /// - `NoObservations` for an empty frame set.
    /// - `ChannelCountMismatch` / `ImageSizeMismatch` naming the first
    ///   offending frame.
    /// - `InvalidUpsamplingScale` if the model reports a factor of 0.
    /// - `DataPointOverflow` if the HR problem is too large. No observation
    ///   has been allocated at that point.
    /// - `Image` if resampling fails.
    pub fn new(model: &'m M, low_res_images: &[ImageData], verbose: bool) -> SolverResult<Self> {
        let first = low_res_images.first().ok_or(SolverError::NoObservations)?;
        let num_channels = first.num_channels();
        let lr_size = first.size();
        for (index, image) in low_res_images.iter().enumerate().skip(1) {
            if image.num_channels() != num_channels {
                return Err(SolverError::ChannelCountMismatch {
                    index,
                    expected: num_channels,
                    found: image.num_channels(),
                });
            }
            if image.size() != lr_size {
                return Err(SolverError::ImageSizeMismatch {
                    index,
                    expected: (lr_size.width, lr_size.height),
                    found: (image.size().width, image.size().height),
                });
            }
        }

        let scale = model.downsampling_scale();
        if scale == 0 {
            return Err(SolverError::InvalidUpsamplingScale { scale });
        }
        let image_size = lr_size.scaled(scale).ok_or(SolverError::DataPointOverflow {
            width: lr_size.width.saturating_mul(scale),
            height: lr_size.height.saturating_mul(scale),
            channels: num_channels,
            max: MAX_DATA_POINTS,
        })?;
        let num_data_points = data_point_count(image_size, num_channels)?;

        let observations = low_res_images
            .iter()
            .map(|image| image.resized(image_size, InterpolationMode::Nearest))
            .collect::<Result<Vec<_>, _>>()?;

        if verbose {
            info!(
                observations = observations.len(),
                channels = num_channels,
                lr_size = %lr_size,
                hr_size = %image_size,
                data_points = num_data_points,
                "constructed MAP solver"
            );
        }

        Ok(Self {
            model,
            observations,
            regularizers: RegularizerRegistry::new(),
            num_channels,
            image_size,
            num_data_points,
            verbose,
        })
    }

    /// Append a weighted regularizer. The same handle may be added more than
    /// once; each binding contributes independently.
    ///
    /// Errors
    /// ------
    /// - `Regularizer(InvalidWeight)` for a negative or non-finite weight.
    pub fn add_regularizer(
        &mut self, regularizer: Arc<dyn Regularizer>, regularization_parameter: f64,
    ) -> SolverResult<()> {
        if self.verbose {
            debug!(
                regularizer = regularizer.name(),
                weight = regularization_parameter,
                "adding regularizer"
            );
        }
        self.regularizers.add_regularizer(regularizer, regularization_parameter)?;
        Ok(())
    }

    /// Sum of all regularization weights, `0.0` without regularizers.
    pub fn regularization_parameter_sum(&self) -> f64 {
        self.regularizers.regularization_parameter_sum()
    }

    pub fn observations(&self) -> &[ImageData] {
        &self.observations
    }

    pub fn regularizers(&self) -> &RegularizerRegistry {
        &self.regularizers
    }

    pub fn model(&self) -> &M {
        self.model
    }

    fn joint_objective(&self) -> MapObjective<'_, M> {
        MapObjective::joint(
            self.model,
            &self.observations,
            &self.regularizers,
            self.image_size,
            self.num_channels,
        )
    }

    fn check_estimate(&self, estimate: &ImageData) -> SolverResult<()> {
        let size = estimate.size();
        if estimate.num_channels() != self.num_channels || size != self.image_size {
            return Err(SolverError::InitialEstimateMismatch {
                expected: (self.num_channels, self.image_size.width, self.image_size.height),
                found: (estimate.num_channels(), size.width, size.height),
            });
        }
        Ok(())
    }

    /// Minimize one (sub-)problem with thresholds adapted to its size.
    fn run<O: Objective>(
        &self, objective: &O, theta0: Theta, options: &SolverOptions, label: &str,
    ) -> SolverResult<RunOutcome> {
        let mut opts = options.clone();
        opts.adjust_thresholds_adaptively(
            objective.num_parameters(),
            self.regularization_parameter_sum(),
        );
        if self.verbose {
            info!(problem = label, parameters = objective.num_parameters(), "starting solve");
            opts.print_solver_options();
        }

        let outcome = minimize(objective, theta0, &opts, self.verbose)?;

        if self.verbose {
            match &outcome.status {
                RunStatus::Converged => info!(
                    problem = label,
                    iterations = outcome.iterations,
                    cost = outcome.cost,
                    "converged"
                ),
                RunStatus::MaxIterations => warn!(
                    problem = label,
                    iterations = outcome.iterations,
                    cost = outcome.cost,
                    "iteration budget exhausted before convergence"
                ),
                RunStatus::Stopped(reason) => warn!(
                    problem = label,
                    iterations = outcome.iterations,
                    cost = outcome.cost,
                    reason = %reason,
                    "backend stopped"
                ),
            }
        }
        Ok(outcome)
    }
}

impl<M: ImageModel + ?Sized> Solver for MapSolver<'_, M> {
    fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn image_size(&self) -> ImageSize {
        self.image_size
    }

    fn num_data_points(&self) -> usize {
        self.num_data_points
    }

    fn evaluate_cost(&self, estimate: &Theta) -> SolverResult<f64> {
        let objective = self.joint_objective();
        check_length(estimate, objective.num_parameters())?;
        let value = objective.cost(estimate)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(value)
    }

    fn evaluate_gradient(&self, estimate: &Theta) -> SolverResult<Grad> {
        let objective = self.joint_objective();
        check_length(estimate, objective.num_parameters())?;
        let gradient = objective.gradient(estimate)?;
        validate_grad(&gradient, estimate.len())?;
        Ok(gradient)
    }

    fn solve(
        &self, initial_estimate: &ImageData, options: &SolverOptions,
    ) -> SolverResult<SolveOutcome> {
        self.check_estimate(initial_estimate)?;

        if !options.split_channels {
            let objective = self.joint_objective();
            let outcome =
                self.run(&objective, initial_estimate.to_theta(), options, "all channels")?;
            let estimate =
                ImageData::from_theta(&outcome.estimate, self.image_size, self.num_channels)?;
            return Ok(SolveOutcome { estimate, runs: vec![outcome] });
        }

        let mut channels = Vec::with_capacity(self.num_channels);
        let mut runs = Vec::with_capacity(self.num_channels);
        for channel in 0..self.num_channels {
            let objective = MapObjective::channel(
                self.model,
                &self.observations,
                &self.regularizers,
                self.image_size,
                channel,
            )?;
            let theta0 = initial_estimate.channel_image(channel)?.to_theta();
            let outcome = self.run(&objective, theta0, options, &format!("channel {channel}"))?;
            channels.push(ImageData::from_theta(&outcome.estimate, self.image_size, 1)?);
            runs.push(outcome);
        }
        let estimate = ImageData::stack(&channels)?;
        Ok(SolveOutcome { estimate, runs })
    }
}

fn check_length(theta: &Theta, expected: usize) -> SolverResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() }.into());
    }
    Ok(())
}
