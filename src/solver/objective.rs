//! MAP objective for one (sub-)problem.
//!
//! Purpose
//! -------
//! Turn the observations, the image model and the regularizer registry into
//! an [`Objective`] the minimizer can drive:
//!
//! ```text
//! cost(x) = Σ_i ‖A_i x − y_i‖²  +  Σ_j w_j R_j(x)
//! grad(x) = 2 Σ_i A_iᵀ (A_i x − y_i)  +  Σ_j w_j ∇R_j(x)
//! ```
//!
//! Key behaviors
//! -------------
//! - A joint objective borrows all observations and covers every channel.
//! - A channel objective owns single-channel copies of the observations and
//!   covers one contiguous block of the parameter vector.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations live on the HR lattice, so residuals are taken pixel by
//!   pixel; a model whose output shape differs from the observation is an
//!   error, not a broadcast.
//! - Evaluation is read-only; the objective can be queried any number of
//!   times in any order.
use crate::{
    image::{ImageData, ImageSize},
    model::{ImageModel, ModelError},
    optimization::{
        errors::OptResult,
        minimizer::{Cost, Grad, Objective, Theta},
    },
    regularization::RegularizerRegistry,
};
use std::borrow::Cow;

pub(crate) struct MapObjective<'a, M: ImageModel + ?Sized> {
    model: &'a M,
    observations: Cow<'a, [ImageData]>,
    regularizers: &'a RegularizerRegistry,
    image_size: ImageSize,
    num_channels: usize,
}

impl<'a, M: ImageModel + ?Sized> MapObjective<'a, M> {
    /// Objective over all channels at once.
    pub(crate) fn joint(
        model: &'a M, observations: &'a [ImageData], regularizers: &'a RegularizerRegistry,
        image_size: ImageSize, num_channels: usize,
    ) -> Self {
        Self {
            model,
            observations: Cow::Borrowed(observations),
            regularizers,
            image_size,
            num_channels,
        }
    }

    /// Objective restricted to `channel`; observations are sliced once here.
    pub(crate) fn channel(
        model: &'a M, observations: &'a [ImageData], regularizers: &'a RegularizerRegistry,
        image_size: ImageSize, channel: usize,
    ) -> OptResult<Self> {
        let sliced = observations
            .iter()
            .map(|obs| obs.channel_image(channel))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            model,
            observations: Cow::Owned(sliced),
            regularizers,
            image_size,
            num_channels: 1,
        })
    }

    fn to_image(&self, theta: &Theta) -> OptResult<ImageData> {
        Ok(ImageData::from_theta(theta, self.image_size, self.num_channels)?)
    }

    /// `A_i x − y_i` for observation `index`.
    fn residual(&self, image: &ImageData, index: usize) -> OptResult<ImageData> {
        let observation = &self.observations[index];
        let simulated = self.model.apply_to_image(image, index)?;
        let expected = observation.pixels().dim();
        let found = simulated.pixels().dim();
        if expected != found {
            return Err(ModelError::OutputShapeMismatch { index, expected, found }.into());
        }
        Ok(ImageData::new(simulated.into_pixels() - observation.pixels())?)
    }
}

impl<M: ImageModel + ?Sized> Objective for MapObjective<'_, M> {
    fn num_parameters(&self) -> usize {
        self.image_size.area() * self.num_channels
    }

    fn cost(&self, theta: &Theta) -> OptResult<Cost> {
        let image = self.to_image(theta)?;
        let mut data_term = 0.0;
        for index in 0..self.observations.len() {
            let residual = self.residual(&image, index)?;
            data_term += residual.pixels().iter().map(|r| r * r).sum::<f64>();
        }
        Ok(data_term + self.regularizers.weighted_cost(&image)?)
    }

    fn check(&self, theta: &Theta) -> OptResult<()> {
        self.to_image(theta).map(|_| ())
    }

    fn gradient(&self, theta: &Theta) -> OptResult<Grad> {
        let image = self.to_image(theta)?;
        let mut total = self.regularizers.weighted_gradient(&image)?;
        for index in 0..self.observations.len() {
            let residual = self.residual(&image, index)?;
            let back = self.model.apply_transpose_to_image(&residual, index)?;
            let expected = total.pixels().dim();
            let found = back.pixels().dim();
            if expected != found {
                return Err(ModelError::OutputShapeMismatch { index, expected, found }.into());
            }
            total.pixels_mut().scaled_add(2.0, back.pixels());
        }
        Ok(total.to_theta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::BlockDownsamplingModel,
        optimization::{errors::OptError, minimizer::finite_diff::fd_gradient},
        regularization::{Regularizer, TikhonovRegularizer},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array3};
    use std::sync::Arc;

    fn observations() -> Vec<ImageData> {
        let a = Array3::from_shape_fn((2, 4, 4), |(c, i, j)| (c * 16 + i * 4 + j) as f64 * 0.1);
        let b = a.mapv(|v| v + 0.05);
        vec![ImageData::new(a).unwrap(), ImageData::new(b).unwrap()]
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient of the joint objective agrees with finite
    // differences of its cost.
    //
    // Given
    // -----
    // - Two 2-channel 4x4 observations, block model with scale 2.
    // - A Tikhonov prior with weight 0.3.
    // - A non-trivial evaluation point.
    //
    // Expect
    // ------
    // - Componentwise agreement within `1e-4`.
    fn joint_gradient_matches_finite_differences() {
        let model = BlockDownsamplingModel::new(2).unwrap();
        let obs = observations();
        let mut registry = RegularizerRegistry::new();
        let tikhonov: Arc<dyn Regularizer> = Arc::new(TikhonovRegularizer);
        registry.add_regularizer(tikhonov, 0.3).unwrap();
        let objective = MapObjective::joint(&model, &obs, &registry, ImageSize::new(4, 4), 2);

        let theta = Array1::from_shape_fn(objective.num_parameters(), |k| (k as f64 * 0.7).sin());
        let analytic = objective.gradient(&theta).unwrap();
        let numeric = fd_gradient(&theta, &|x: &Theta| objective.cost(x)).unwrap();

        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_abs_diff_eq!(*a, *n, epsilon = 1e-4);
        }
    }

    #[test]
    // Purpose
    // -------
    // A channel objective has one channel's worth of parameters and its cost
    // equals the joint cost restricted to that channel (no prior).
    fn channel_objective_covers_one_channel() {
        let model = BlockDownsamplingModel::new(2).unwrap();
        let obs = observations();
        let registry = RegularizerRegistry::new();
        let size = ImageSize::new(4, 4);
        let joint = MapObjective::joint(&model, &obs, &registry, size, 2);
        let first = MapObjective::channel(&model, &obs, &registry, size, 0).unwrap();
        let second = MapObjective::channel(&model, &obs, &registry, size, 1).unwrap();

        let theta = Array1::from_elem(32, 0.4);
        let head = theta.slice(ndarray::s![..16]).to_owned();
        let tail = theta.slice(ndarray::s![16..]).to_owned();

        assert_eq!(first.num_parameters(), 16);
        assert_abs_diff_eq!(
            joint.cost(&theta).unwrap(),
            first.cost(&head).unwrap() + second.cost(&tail).unwrap(),
            epsilon = 1e-10
        );
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length parameter vector is an error, not a panic.
    fn wrong_length_theta_is_an_error() {
        let model = BlockDownsamplingModel::new(2).unwrap();
        let obs = observations();
        let registry = RegularizerRegistry::new();
        let objective = MapObjective::joint(&model, &obs, &registry, ImageSize::new(4, 4), 2);

        let err = objective.cost(&Array1::zeros(5)).unwrap_err();
        assert!(matches!(err, OptError::Image(_)), "got {err:?}");
    }
}
