use std::hash::{Hash, Hasher};

use crate::error::{NormError, Result};

/// Identifier of one dispersion branch (fundamental mode = 0).
pub type ModeId = i64;

// ---------------------------------------------------------------------------
// Axis – strictly increasing sample positions
// ---------------------------------------------------------------------------

/// Sample positions along one side of the grid (frequency or velocity).
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    /// Wrap `values`, rejecting empty, non-finite or non-increasing input.
    /// `name` only labels the error.
    pub fn new(name: &'static str, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(NormError::EmptyInput(name));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(NormError::NonIncreasingAxis { axis: name, index });
        }
        if let Some(index) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(NormError::NonIncreasingAxis {
                axis: name,
                index: index + 1,
            });
        }
        Ok(Self { values })
    }

    /// `n` evenly spaced samples from `min` to `max` inclusive.
    /// A single sample sits at `min`.
    pub fn linspace(name: &'static str, min: f64, max: f64, n: usize) -> Result<Self> {
        let values = match n {
            0 => Vec::new(),
            1 => vec![min],
            _ => {
                let step = (max - min) / (n - 1) as f64;
                (0..n).map(|i| min + i as f64 * step).collect()
            }
        };
        Self::new(name, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Largest sample.
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Index of the sample nearest to `value`, clamped to the axis.
    pub fn nearest_index(&self, value: f64) -> usize {
        match self.values.binary_search_by(|x| x.total_cmp(&value)) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) if i >= self.values.len() => self.values.len() - 1,
            Err(i) => {
                if value - self.values[i - 1] <= self.values[i] - value {
                    i - 1
                } else {
                    i
                }
            }
        }
    }
}

impl Hash for Axis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_f64s(&self.values, state);
    }
}

// ---------------------------------------------------------------------------
// SpectrumGrid – the dispersion image
// ---------------------------------------------------------------------------

/// Dense energy matrix `S[v][f]` with its two axes.
///
/// Rows run along velocity, columns along frequency. Values are stored
/// row-major in a single buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumGrid {
    data: Vec<f64>,
    f_axis: Axis,
    v_axis: Axis,
}

impl SpectrumGrid {
    /// Build a grid from parsed rows (one row per velocity sample).
    pub fn from_rows(rows: Vec<Vec<f64>>, f_axis: Axis, v_axis: Axis) -> Result<Self> {
        let nf = rows.first().map(Vec::len).ok_or(NormError::EmptyInput("spectrum"))?;
        if nf == 0 {
            return Err(NormError::EmptyInput("spectrum row"));
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != nf {
                return Err(NormError::RaggedRow {
                    row: row + 1,
                    expected: nf,
                    found: values.len(),
                });
            }
        }
        let nv = rows.len();
        Self::from_flat(rows.into_iter().flatten().collect(), nv, nf, f_axis, v_axis)
    }

    /// Build a grid from a row-major buffer of `nv * nf` values.
    pub fn from_flat(
        data: Vec<f64>,
        nv: usize,
        nf: usize,
        f_axis: Axis,
        v_axis: Axis,
    ) -> Result<Self> {
        if nv == 0 || nf == 0 {
            return Err(NormError::EmptyInput("spectrum"));
        }
        if data.len() != nv * nf {
            return Err(NormError::RaggedRow {
                row: data.len() / nf + 1,
                expected: nf,
                found: data.len() % nf,
            });
        }
        if f_axis.len() != nf {
            return Err(NormError::AxisMismatch {
                axis: "frequency",
                expected: nf,
                found: f_axis.len(),
            });
        }
        if v_axis.len() != nv {
            return Err(NormError::AxisMismatch {
                axis: "velocity",
                expected: nv,
                found: v_axis.len(),
            });
        }
        if let Some(pos) = data.iter().position(|x| !x.is_finite() || *x < 0.0) {
            return Err(NormError::malformed(
                pos / nf + 1,
                format!("energy {} is not a finite non-negative number", data[pos]),
            ));
        }
        Ok(Self { data, f_axis, v_axis })
    }

    /// Number of velocity samples (rows).
    pub fn nv(&self) -> usize {
        self.v_axis.len()
    }

    /// Number of frequency samples (columns).
    pub fn nf(&self) -> usize {
        self.f_axis.len()
    }

    pub fn f_axis(&self) -> &Axis {
        &self.f_axis
    }

    pub fn v_axis(&self) -> &Axis {
        &self.v_axis
    }

    pub fn get(&self, v: usize, f: usize) -> f64 {
        self.data[v * self.nf() + f]
    }

    pub fn row(&self, v: usize) -> &[f64] {
        let nf = self.nf();
        &self.data[v * nf..(v + 1) * nf]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.nf())
    }

    /// Values of one frequency column, from lowest to highest velocity.
    pub fn column(&self, f: usize) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().skip(f).step_by(self.nf()).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Same axes, new values. Used by the normalizer, which keeps the shape.
    pub(crate) fn with_data(&self, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            data,
            f_axis: self.f_axis.clone(),
            v_axis: self.v_axis.clone(),
        }
    }
}

impl Hash for SpectrumGrid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.f_axis.hash(state);
        self.v_axis.hash(state);
        hash_f64s(&self.data, state);
    }
}

// ---------------------------------------------------------------------------
// PickedPoint – one manual pick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickedPoint {
    pub frequency: f64,
    pub velocity: f64,
    pub mode: ModeId,
}

impl PickedPoint {
    pub fn new(frequency: f64, velocity: f64, mode: ModeId) -> Self {
        Self {
            frequency,
            velocity,
            mode,
        }
    }
}

impl Hash for PickedPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.frequency.to_bits().hash(state);
        self.velocity.to_bits().hash(state);
        self.mode.hash(state);
    }
}

// ---------------------------------------------------------------------------
// ReferenceCurve – dense per-mode velocity path
// ---------------------------------------------------------------------------

/// Reference velocity of one mode at every frequency sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    pub mode: ModeId,
    /// One velocity per frequency sample.
    pub velocities: Vec<f64>,
    /// `true` where the velocity comes from a trend fit rather than picks.
    pub extrapolated: Vec<bool>,
}

impl ReferenceCurve {
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// WeightMatrix
// ---------------------------------------------------------------------------

/// Per-cell weights with the same `nv × nf` layout as [`SpectrumGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: Vec<f64>,
    nv: usize,
    nf: usize,
}

impl WeightMatrix {
    /// Uniform weight 1.0 everywhere.
    pub fn ones(nv: usize, nf: usize) -> Self {
        Self::filled(nv, nf, 1.0)
    }

    pub fn filled(nv: usize, nf: usize, value: f64) -> Self {
        Self {
            data: vec![value; nv * nf],
            nv,
            nf,
        }
    }

    pub fn nv(&self) -> usize {
        self.nv
    }

    pub fn nf(&self) -> usize {
        self.nf
    }

    pub fn get(&self, v: usize, f: usize) -> f64 {
        self.data[v * self.nf + f]
    }

    pub fn set(&mut self, v: usize, f: usize, w: f64) {
        self.data[v * self.nf + f] = w;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

// -- helpers --

/// Hash floats by bit pattern so identical inputs share a cache key.
pub(crate) fn hash_f64s<H: Hasher>(values: &[f64], state: &mut H) {
    values.len().hash(state);
    for v in values {
        v.to_bits().hash(state);
    }
}
