//! Pick-guided normalization of surface-wave dispersion spectra.
//!
//! A dispersion image `S[v][f]` is re-weighted toward manually picked
//! dispersion curves and then rescaled so every frequency column peaks at 1.
//!
//! ```
//! use seisnorm::config::{NormalizationConfig, NormalizationMode};
//! use seisnorm::data::model::{Axis, PickedPoint, SpectrumGrid};
//!
//! let spectrum = SpectrumGrid::from_rows(
//!     vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]],
//!     Axis::linspace("frequency", 0.0, 0.8, 3)?,
//!     Axis::linspace("velocity", 2.5, 5.0, 3)?,
//! )?;
//! let picks = vec![PickedPoint::new(0.0, 2.5, 0), PickedPoint::new(0.8, 5.0, 0)];
//! let config = NormalizationConfig::new(NormalizationMode::WeightedGaussian, 0.5)?;
//!
//! let out = seisnorm::pipeline::run(&spectrum, &picks, &config);
//! assert_eq!(out.normalized.nf(), 3);
//! # Ok::<(), seisnorm::error::NormError>(())
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod render;
pub mod state;

pub use config::{NormalizationConfig, NormalizationMode};
pub use error::NormError;
pub use state::Session;
