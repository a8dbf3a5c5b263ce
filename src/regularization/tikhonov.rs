//! Tikhonov smoothness prior.
//!
//! `R(x) = Σ_c Σ_{i,j} (x[c,i,j+1] − x[c,i,j])² + (x[c,i+1,j] − x[c,i,j])²`
//! over all neighbour pairs inside the image, i.e. the squared norm of the
//! forward-difference image gradient. Channels are independent.
use crate::{
    image::ImageData,
    regularization::{Regularizer, errors::RegularizerResult},
};
use ndarray::{Array3, Axis};

/// Squared forward-difference penalty with an analytic gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TikhonovRegularizer;

impl TikhonovRegularizer {
    pub fn new() -> Self {
        Self
    }
}

impl Regularizer for TikhonovRegularizer {
    fn name(&self) -> &str {
        "tikhonov"
    }

    fn cost(&self, image: &ImageData) -> RegularizerResult<f64> {
        let mut total = 0.0;
        for plane in image.pixels().axis_iter(Axis(0)) {
            let (height, width) = plane.dim();
            for i in 0..height {
                for j in 0..width {
                    if j + 1 < width {
                        total += (plane[[i, j + 1]] - plane[[i, j]]).powi(2);
                    }
                    if i + 1 < height {
                        total += (plane[[i + 1, j]] - plane[[i, j]]).powi(2);
                    }
                }
            }
        }
        Ok(total)
    }

    fn gradient(&self, image: &ImageData) -> RegularizerResult<ImageData> {
        let pixels = image.pixels();
        let mut grad = Array3::<f64>::zeros(pixels.dim());
        for (mut g, plane) in grad.axis_iter_mut(Axis(0)).zip(pixels.axis_iter(Axis(0))) {
            let (height, width) = plane.dim();
            for i in 0..height {
                for j in 0..width {
                    if j + 1 < width {
                        let d = plane[[i, j + 1]] - plane[[i, j]];
                        g[[i, j + 1]] += 2.0 * d;
                        g[[i, j]] -= 2.0 * d;
                    }
                    if i + 1 < height {
                        let d = plane[[i + 1, j]] - plane[[i, j]];
                        g[[i + 1, j]] += 2.0 * d;
                        g[[i, j]] -= 2.0 * d;
                    }
                }
            }
        }
        Ok(ImageData::new(grad)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageSize;
    use approx::assert_abs_diff_eq;
    use finitediff::FiniteDiff;

    #[test]
    // Purpose
    // -------
    // Constant images cost nothing; a single step edge costs its squared
    // height once per crossing pair.
    //
    // Given
    // -----
    // - A constant 4x3 image.
    // - A 2x2 image `[[0, 1], [0, 1]]`.
    //
    // Expect
    // ------
    // - Costs `0` and `2` (two horizontal pairs with difference 1).
    fn cost_of_constant_and_edge_images() {
        let flat = ImageData::filled(ImageSize::new(4, 3), 2, 7.0).unwrap();
        let edge = ImageData::new(
            Array3::from_shape_vec((1, 2, 2), vec![0.0, 1.0, 0.0, 1.0]).unwrap(),
        )
        .unwrap();

        assert_eq!(TikhonovRegularizer.cost(&flat).unwrap(), 0.0);
        assert_eq!(TikhonovRegularizer.cost(&edge).unwrap(), 2.0);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches central differences of the cost.
    fn gradient_matches_finite_differences() {
        let pixels = Array3::from_shape_fn((2, 3, 4), |(c, i, j)| {
            ((c * 7 + i * 3 + j) as f64 * 0.37).sin()
        });
        let image = ImageData::new(pixels).unwrap();
        let (size, channels) = (image.size(), image.num_channels());

        let analytic = TikhonovRegularizer.gradient(&image).unwrap().to_theta();
        let numeric = image.to_theta().central_diff(&|x| {
            let img = ImageData::from_theta(x, size, channels).unwrap();
            TikhonovRegularizer.cost(&img).unwrap()
        });

        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_abs_diff_eq!(*a, *n, epsilon = 1e-6);
        }
    }
}
