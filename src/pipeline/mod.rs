/// Numeric core: picks → reference curves → weights → normalized spectrum.
///
/// ```text
///   Vec<PickedPoint>          SpectrumGrid        NormalizationConfig
///        │                        │                     │
///        ▼                        │                     │
///   ┌──────────┐                  │                     │
///   │  curve   │ per-mode reference velocities          │
///   └──────────┘                  │                     │
///        │                        │                     │
///        ▼                        ▼                     ▼
///   ┌──────────┐
///   │  weight  │ nv × nf kernel weights in [background, 1]
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │ S ∘ W, each column divided by its maximum
///   └───────────┘
/// ```
///
/// Every stage is a pure function of its inputs. [`crate::state::Session`]
/// caches the stages between runs.
pub mod curve;
pub mod normalize;
pub mod weight;

use std::collections::BTreeMap;

use crate::config::NormalizationConfig;
use crate::data::model::{ModeId, PickedPoint, ReferenceCurve, SpectrumGrid, WeightMatrix};

/// Everything one pass produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub curves: BTreeMap<ModeId, ReferenceCurve>,
    pub weights: WeightMatrix,
    pub normalized: SpectrumGrid,
}

/// Run all three stages once.
pub fn run(
    spectrum: &SpectrumGrid,
    picks: &[PickedPoint],
    config: &NormalizationConfig,
) -> PipelineOutput {
    let curves = curve::reconstruct_curves(picks, spectrum.f_axis());
    let weights = weight::weight_field(spectrum.f_axis(), spectrum.v_axis(), &curves, config);
    let normalized = normalize::normalize(spectrum, &weights);
    PipelineOutput {
        curves,
        weights,
        normalized,
    }
}
