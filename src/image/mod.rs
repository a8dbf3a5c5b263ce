//! image — multi-channel image containers and resampling.
//!
//! Purpose
//! -------
//! Give the rest of the crate one image type ([`ImageData`]) with explicit
//! lattice sizes ([`ImageSize`]) and an explicit interpolation policy
//! ([`InterpolationMode`]) for moving frames between the LR and HR grids.
//!
//! Conventions
//! -----------
//! - Pixels are `f64`, indexed `(channel, row, col)`.
//! - Flat parameter vectors are channel-major, so each channel is one
//!   contiguous slice; per-channel optimization relies on this.
//! - No image I/O happens here; callers bring their own decoded pixels.

pub mod data;
pub mod errors;
pub mod resize;

pub use self::data::{ImageData, ImageSize};
pub use self::errors::{ImageError, ImageResult};
pub use self::resize::InterpolationMode;
