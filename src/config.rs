//! Normalization parameters.
//!
//! [`NormalizationConfig`] is immutable for one pipeline pass. It can be
//! built in code, read from a JSON file, or assembled from CLI flags.
//!
//! ```json
//! { "mode": "weighted_triangular", "sigma_factor": 0.8,
//!   "kernel": { "base_wide": 0.12, "base_narrow": 0.03, "background": 0.02 } }
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{NormError, Result};

/// Kernel half-width at the lowest frequency, before the sigma factor.
pub const BASE_WIDE: f64 = 0.10;

/// Kernel half-width at the highest frequency, before the sigma factor.
pub const BASE_NARROW: f64 = 0.03;

/// Weight floor for cells far from every curve. Keeps columns away from zero.
pub const BACKGROUND_WEIGHT: f64 = 0.05;

pub const DEFAULT_SIGMA_FACTOR: f64 = 0.5;

// ---------------------------------------------------------------------------
// NormalizationMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Per-column max normalization with no weighting.
    Simple,
    /// Gaussian kernel around each reference curve.
    #[default]
    WeightedGaussian,
    /// Triangular (linear fall-off) kernel around each reference curve.
    WeightedTriangular,
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationMode::Simple => write!(f, "Simple (column max)"),
            NormalizationMode::WeightedGaussian => write!(f, "Weighted Gaussian (adaptive)"),
            NormalizationMode::WeightedTriangular => write!(f, "Weighted Triangular (adaptive)"),
        }
    }
}

// ---------------------------------------------------------------------------
// KernelParams
// ---------------------------------------------------------------------------

/// Shape constants of the adaptive kernel.
///
/// The half-width shrinks linearly from `base_wide` at zero frequency to
/// `base_narrow` at the top of the frequency axis, then scales by the
/// sigma factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelParams {
    pub base_wide: f64,
    pub base_narrow: f64,
    pub background: f64,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            base_wide: BASE_WIDE,
            base_narrow: BASE_NARROW,
            background: BACKGROUND_WEIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub mode: NormalizationMode,
    pub sigma_factor: f64,
    pub kernel: KernelParams,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            mode: NormalizationMode::default(),
            sigma_factor: DEFAULT_SIGMA_FACTOR,
            kernel: KernelParams::default(),
        }
    }
}

impl NormalizationConfig {
    pub fn new(mode: NormalizationMode, sigma_factor: f64) -> Result<Self> {
        let config = Self {
            mode,
            sigma_factor,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Simple mode: weights are ignored.
    pub fn simple() -> Self {
        Self {
            mode: NormalizationMode::Simple,
            ..Self::default()
        }
    }

    pub fn with_kernel(mut self, kernel: KernelParams) -> Result<Self> {
        self.kernel = kernel;
        self.validate()?;
        Ok(self)
    }

    /// Check that every width the kernel can produce is positive and the
    /// background floor lies in `(0, 1]`, so no cell with energy is zeroed.
    pub fn validate(&self) -> Result<()> {
        let KernelParams {
            base_wide,
            base_narrow,
            background,
        } = self.kernel;

        if !(self.sigma_factor.is_finite() && self.sigma_factor > 0.0) {
            return Err(NormError::invalid_config(format!(
                "sigma factor must be positive, got {}",
                self.sigma_factor
            )));
        }
        if !(base_narrow.is_finite() && base_narrow > 0.0) {
            return Err(NormError::invalid_config(format!(
                "base_narrow must be positive, got {base_narrow}"
            )));
        }
        if !(base_wide.is_finite() && base_wide >= base_narrow) {
            return Err(NormError::invalid_config(format!(
                "base_wide ({base_wide}) must be at least base_narrow ({base_narrow})"
            )));
        }
        if !(background > 0.0 && background <= 1.0) {
            return Err(NormError::invalid_config(format!(
                "background weight must lie in (0, 1], got {background}"
            )));
        }
        Ok(())
    }

    /// Read a config from JSON. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("config file {}", path.display()))?;
        Ok(config)
    }
}

impl Hash for NormalizationConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.sigma_factor.to_bits().hash(state);
        self.kernel.base_wide.to_bits().hash(state);
        self.kernel.base_narrow.to_bits().hash(state);
        self.kernel.background.to_bits().hash(state);
    }
}
