use std::collections::BTreeMap;

use crate::config::{KernelParams, NormalizationConfig, NormalizationMode};
use crate::data::model::{Axis, ModeId, ReferenceCurve, WeightMatrix};

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Half-width of the acceptance band at frequency `f`.
///
/// Narrows linearly from `base_wide` at `f = 0` to `base_narrow` at
/// `f = f_max`. The frequency ratio is clamped to `[0, 1]`, so the result
/// stays positive for any validated config.
pub fn half_width(f: f64, f_max: f64, kernel: &KernelParams, sigma_factor: f64) -> f64 {
    let ratio = if f_max > 0.0 {
        (f / f_max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (kernel.base_wide - (kernel.base_wide - kernel.base_narrow) * ratio) * sigma_factor
}

/// Weight of velocity `v` against reference `v_ref` for one mode.
/// `Simple` mode has no kernel and always yields 1.
pub fn kernel_weight(mode: NormalizationMode, v: f64, v_ref: f64, half_width: f64) -> f64 {
    match mode {
        NormalizationMode::Simple => 1.0,
        NormalizationMode::WeightedGaussian => {
            let z = (v - v_ref) / half_width;
            (-0.5 * z * z).exp()
        }
        NormalizationMode::WeightedTriangular => (1.0 - (v - v_ref).abs() / half_width).max(0.0),
    }
}

// ---------------------------------------------------------------------------
// Weight field
// ---------------------------------------------------------------------------

/// Build the `nv × nf` weight matrix for the given reference curves.
///
/// Each cell takes the strongest weight over all modes, floored at the
/// background weight. Columns are independent of one another.
pub fn weight_field(
    f_axis: &Axis,
    v_axis: &Axis,
    curves: &BTreeMap<ModeId, ReferenceCurve>,
    config: &NormalizationConfig,
) -> WeightMatrix {
    let (nv, nf) = (v_axis.len(), f_axis.len());
    if config.mode == NormalizationMode::Simple {
        return WeightMatrix::ones(nv, nf);
    }

    let background = config.kernel.background;
    let f_max = f_axis.max();
    let mut weights = WeightMatrix::filled(nv, nf, background);

    for (i, &f) in f_axis.as_slice().iter().enumerate() {
        let hw = half_width(f, f_max, &config.kernel, config.sigma_factor);
        for (j, &v) in v_axis.as_slice().iter().enumerate() {
            let w = curves
                .values()
                .filter_map(|c| c.velocities.get(i))
                .map(|&v_ref| kernel_weight(config.mode, v, v_ref, hw))
                .fold(background, f64::max);
            weights.set(j, i, w);
        }
    }

    log::debug!(
        "Built {nv}x{nf} weight field from {} curve(s), mode {}",
        curves.len(),
        config.mode
    );
    weights
}
