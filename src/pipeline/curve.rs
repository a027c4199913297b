use std::collections::BTreeMap;

use crate::data::model::{Axis, ModeId, PickedPoint, ReferenceCurve};

/// Number of picks at each end of a mode used for the extrapolation trend.
pub const TREND_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// Linear trend
// ---------------------------------------------------------------------------

/// `v = slope * f + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares over `(f, v)` pairs.
    ///
    /// Fewer than two points give a horizontal line at the only velocity
    /// (or 0). Points that all share one frequency give a horizontal line at
    /// their mean velocity.
    pub fn fit(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        if n < 2 {
            let v = points.first().map_or(0.0, |&(_, v)| v);
            return Self::constant(v);
        }

        let nf = n as f64;
        let (mut sum_f, mut sum_v, mut sum_fv, mut sum_ff) = (0.0, 0.0, 0.0, 0.0);
        for &(f, v) in points {
            sum_f += f;
            sum_v += v;
            sum_fv += f * v;
            sum_ff += f * f;
        }

        let denom = nf * sum_ff - sum_f * sum_f;
        if denom.abs() <= f64::EPSILON * nf * sum_ff.abs().max(1.0) {
            return Self::constant(sum_v / nf);
        }
        let slope = (nf * sum_fv - sum_f * sum_v) / denom;
        let intercept = (sum_v - slope * sum_f) / nf;
        Self { slope, intercept }
    }

    pub fn constant(v: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: v,
        }
    }

    pub fn eval(&self, f: f64) -> f64 {
        self.slope * f + self.intercept
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Split picks by mode, each mode sorted by ascending frequency.
///
/// Modes come out in ascending id order; picks sharing a frequency keep
/// their input order.
pub fn group_by_mode(picks: &[PickedPoint]) -> BTreeMap<ModeId, Vec<(f64, f64)>> {
    let mut groups: BTreeMap<ModeId, Vec<(f64, f64)>> = BTreeMap::new();
    for p in picks {
        groups
            .entry(p.mode)
            .or_default()
            .push((p.frequency, p.velocity));
    }
    for points in groups.values_mut() {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    groups
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Dense reference curve for every mode present in `picks`.
pub fn reconstruct_curves(
    picks: &[PickedPoint],
    f_axis: &Axis,
) -> BTreeMap<ModeId, ReferenceCurve> {
    group_by_mode(picks)
        .into_iter()
        .map(|(mode, points)| {
            if points.len() < 2 {
                log::warn!(
                    "Mode {mode} has {} pick(s); using a constant reference velocity",
                    points.len()
                );
            }
            (mode, reconstruct_mode(mode, &points, f_axis))
        })
        .collect()
}

/// Resample one mode's sorted picks onto `f_axis`.
///
/// Inside the picked range the curve interpolates linearly between
/// neighbouring picks; outside it follows the trend of the nearest
/// [`TREND_WINDOW`] picks. With no picks the curve is all zeros.
pub fn reconstruct_mode(mode: ModeId, points: &[(f64, f64)], f_axis: &Axis) -> ReferenceCurve {
    let n = points.len();
    if n == 0 {
        return ReferenceCurve {
            mode,
            velocities: vec![0.0; f_axis.len()],
            extrapolated: vec![true; f_axis.len()],
        };
    }

    let window = TREND_WINDOW.min(n);
    let left = LinearFit::fit(&points[..window]);
    let right = LinearFit::fit(&points[n - window..]);
    let f_min = points[0].0;
    let f_max = points[n - 1].0;

    let mut velocities = Vec::with_capacity(f_axis.len());
    let mut extrapolated = Vec::with_capacity(f_axis.len());
    for &f in f_axis.as_slice() {
        let (v, outside) = if f < f_min {
            (left.eval(f), true)
        } else if f > f_max {
            (right.eval(f), true)
        } else {
            (interpolate(points, f), false)
        };
        velocities.push(v);
        extrapolated.push(outside);
    }

    ReferenceCurve {
        mode,
        velocities,
        extrapolated,
    }
}

/// Piecewise-linear value at `f`, which must lie within the picked range.
///
/// The bracket's right end is the first pick with frequency `>= f`; an
/// exact hit returns that pick's velocity.
fn interpolate(points: &[(f64, f64)], f: f64) -> f64 {
    let k = points.partition_point(|&(pf, _)| pf < f);
    if k >= points.len() {
        return points[points.len() - 1].1;
    }
    let (f1, v1) = points[k];
    if k == 0 {
        return v1;
    }
    // f0 < f <= f1: a zero-width bracket cannot reach here, and an exact hit
    // on duplicated frequencies lands on the first of them.
    let (f0, v0) = points[k - 1];
    if f == f1 {
        return v1;
    }
    v0 + (v1 - v0) * (f - f0) / (f1 - f0)
}
