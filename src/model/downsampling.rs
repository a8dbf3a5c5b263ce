//! Block-average downsampling as an image-formation model.
//!
//! The forward operator averages every `scale x scale` block of the HR image
//! and writes the mean back into each pixel of the block. The result stays on
//! the HR lattice, which is where observations live after nearest-neighbour
//! upsampling, so residuals can be taken pixel by pixel.
//!
//! Averaging-and-replicating is an orthogonal projection, hence the operator
//! is its own transpose.
use crate::{
    image::ImageData,
    model::{
        ImageModel,
        errors::{ModelError, ModelResult},
    },
};
use ndarray::{Axis, s};

/// Image-formation model made of a single block-average downsampling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDownsamplingModel {
    scale: usize,
}

impl BlockDownsamplingModel {
    /// Errors
    /// ------
    /// - [`ModelError::InvalidScale`] if `scale == 0`.
    pub fn new(scale: usize) -> ModelResult<Self> {
        if scale == 0 {
            return Err(ModelError::InvalidScale { scale });
        }
        Ok(Self { scale })
    }

    fn block_average(&self, image: &ImageData) -> ModelResult<ImageData> {
        let size = image.size();
        let scale = self.scale;
        if size.width % scale != 0 || size.height % scale != 0 {
            return Err(ModelError::SizeNotDivisible {
                width: size.width,
                height: size.height,
                scale,
            });
        }
        let mut out = image.clone();
        let norm = (scale * scale) as f64;
        for mut plane in out.pixels_mut().axis_iter_mut(Axis(0)) {
            for by in (0..size.height).step_by(scale) {
                for bx in (0..size.width).step_by(scale) {
                    let mut block = plane.slice_mut(s![by..by + scale, bx..bx + scale]);
                    let mean = block.sum() / norm;
                    block.fill(mean);
                }
            }
        }
        Ok(out)
    }
}

impl ImageModel for BlockDownsamplingModel {
    fn downsampling_scale(&self) -> usize {
        self.scale
    }

    fn apply_to_image(&self, image: &ImageData, _index: usize) -> ModelResult<ImageData> {
        self.block_average(image)
    }

    fn apply_transpose_to_image(&self, image: &ImageData, _index: usize) -> ModelResult<ImageData> {
        self.block_average(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The forward operator replaces each block by its mean.
    //
    // Given
    // -----
    // - A 4x2 single-channel image with two 2x2 blocks.
    //
    // Expect
    // ------
    // - Left block mean 2.5, right block mean 6.5, replicated per pixel.
    fn apply_replaces_blocks_by_mean() {
        let model = BlockDownsamplingModel::new(2).unwrap();
        let image =
            ImageData::from_channels(&[array![[1.0, 2.0, 5.0, 6.0], [3.0, 4.0, 7.0, 8.0]]]).unwrap();

        let out = model.apply_to_image(&image, 0).unwrap();

        assert_eq!(out.to_theta(), array![2.5, 2.5, 6.5, 6.5, 2.5, 2.5, 6.5, 6.5]);
    }

    #[test]
    // Purpose
    // -------
    // The operator is self-adjoint: <A x, y> == <x, A^T y>.
    fn transpose_is_adjoint() {
        let model = BlockDownsamplingModel::new(2).unwrap();
        let x = ImageData::from_channels(&[array![[1.0, -2.0], [0.5, 3.0]]]).unwrap();
        let y = ImageData::from_channels(&[array![[4.0, 1.0], [-1.0, 2.0]]]).unwrap();

        let lhs = model.apply_to_image(&x, 0).unwrap().to_theta().dot(&y.to_theta());
        let rhs = x.to_theta().dot(&model.apply_transpose_to_image(&y, 0).unwrap().to_theta());

        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_scale_and_indivisible_sizes() {
        assert_eq!(BlockDownsamplingModel::new(0).unwrap_err(), ModelError::InvalidScale { scale: 0 });

        let model = BlockDownsamplingModel::new(2).unwrap();
        let image = ImageData::from_channels(&[array![[1.0, 2.0, 3.0]]]).unwrap();
        assert_eq!(
            model.apply_to_image(&image, 0).unwrap_err(),
            ModelError::SizeNotDivisible { width: 3, height: 1, scale: 2 }
        );
    }
}
