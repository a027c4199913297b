use crate::data::model::{SpectrumGrid, WeightMatrix};
use crate::error::{NormError, Result};

/// Stand-in for a column maximum that is zero or not finite.
pub const COLUMN_EPSILON: f64 = 1e-12;

/// Weight the spectrum cell by cell, then divide each frequency column by
/// its own weighted maximum.
///
/// Every output column peaks at exactly 1.0, or is all zeros when the
/// weighted column was all zeros. Fails if `weights` does not have the
/// spectrum's shape.
pub fn try_normalize(spectrum: &SpectrumGrid, weights: &WeightMatrix) -> Result<SpectrumGrid> {
    if weights.nv() != spectrum.nv() {
        return Err(NormError::AxisMismatch {
            axis: "weight velocity",
            expected: spectrum.nv(),
            found: weights.nv(),
        });
    }
    if weights.nf() != spectrum.nf() {
        return Err(NormError::AxisMismatch {
            axis: "weight frequency",
            expected: spectrum.nf(),
            found: weights.nf(),
        });
    }
    Ok(normalize(spectrum, weights))
}

/// [`try_normalize`] for weights built from the spectrum's own axes.
///
/// Panics if `weights` does not have the spectrum's shape.
pub(crate) fn normalize(spectrum: &SpectrumGrid, weights: &WeightMatrix) -> SpectrumGrid {
    let (nv, nf) = (spectrum.nv(), spectrum.nf());
    assert_eq!(
        (weights.nv(), weights.nf()),
        (nv, nf),
        "weight matrix shape does not match the spectrum"
    );

    let mut out: Vec<f64> = spectrum
        .as_slice()
        .iter()
        .zip(weights.as_slice())
        .map(|(s, w)| s * w)
        .collect();

    for f in 0..nf {
        let col_max = (0..nv).map(|v| out[v * nf + f]).fold(0.0, f64::max);
        let scale = if col_max.is_finite() && col_max > 0.0 {
            col_max
        } else {
            COLUMN_EPSILON
        };
        for v in 0..nv {
            out[v * nf + f] /= scale;
        }
    }

    spectrum.with_data(out)
}

/// Column-max normalization without weighting.
pub fn normalize_simple(spectrum: &SpectrumGrid) -> SpectrumGrid {
    normalize(spectrum, &WeightMatrix::ones(spectrum.nv(), spectrum.nf()))
}

/// Largest value of each frequency column.
pub fn column_maxima(grid: &SpectrumGrid) -> Vec<f64> {
    (0..grid.nf())
        .map(|f| grid.column(f).fold(0.0, f64::max))
        .collect()
}
