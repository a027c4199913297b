use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::config::NormalizationConfig;
use crate::data::model::{ModeId, PickedPoint, ReferenceCurve, SpectrumGrid, WeightMatrix};
use crate::error::Result;
use crate::pipeline::{curve, normalize, weight};

// ---------------------------------------------------------------------------
// Cached stage
// ---------------------------------------------------------------------------

/// A stage result together with the hash of the inputs it was built from.
#[derive(Debug, Clone)]
struct Cached<T> {
    key: u64,
    value: T,
}

fn key_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Return the cached value for `key`, rebuilding it when the key changed.
fn refresh<'a, T>(
    slot: &'a mut Option<Cached<T>>,
    key: u64,
    counter: &mut u64,
    build: impl FnOnce() -> T,
) -> &'a T {
    if slot.as_ref().is_some_and(|c| c.key != key) {
        *slot = None;
    }
    &slot
        .get_or_insert_with(|| {
            *counter += 1;
            Cached {
                key,
                value: build(),
            }
        })
        .value
}

/// How many times each stage has actually been computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub curves: u64,
    pub weights: u64,
    pub normalized: u64,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Inputs of the pipeline plus memoized stage results.
///
/// Setters only replace inputs. Each getter rebuilds its stage when the
/// hash of that stage's inputs differs from the cached one, so changing the
/// config leaves the reference curves alone and re-loading identical picks
/// recomputes nothing.
#[derive(Debug, Clone)]
pub struct Session {
    spectrum: SpectrumGrid,
    picks: Vec<PickedPoint>,
    config: NormalizationConfig,

    curves: Option<Cached<BTreeMap<ModeId, ReferenceCurve>>>,
    weights: Option<Cached<WeightMatrix>>,
    normalized: Option<Cached<SpectrumGrid>>,

    stats: RecomputeStats,
}

impl Session {
    pub fn new(
        spectrum: SpectrumGrid,
        picks: Vec<PickedPoint>,
        config: NormalizationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            spectrum,
            picks,
            config,
            curves: None,
            weights: None,
            normalized: None,
            stats: RecomputeStats::default(),
        })
    }

    pub fn spectrum(&self) -> &SpectrumGrid {
        &self.spectrum
    }

    pub fn picks(&self) -> &[PickedPoint] {
        &self.picks
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    pub fn set_spectrum(&mut self, spectrum: SpectrumGrid) {
        self.spectrum = spectrum;
    }

    pub fn set_picks(&mut self, picks: Vec<PickedPoint>) {
        self.picks = picks;
    }

    /// Replace the config. An invalid config is rejected and the old one kept.
    pub fn set_config(&mut self, config: NormalizationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Reference curves for the current picks and frequency axis.
    pub fn curves(&mut self) -> &BTreeMap<ModeId, ReferenceCurve> {
        let curves_key = self.curves_key();
        refresh(&mut self.curves, curves_key, &mut self.stats.curves, || {
            build_curves(&self.picks, &self.spectrum)
        })
    }

    /// Weight field for the current curves, axes and config.
    pub fn weights(&mut self) -> &WeightMatrix {
        let curves_key = self.curves_key();
        let weights_key = self.weights_key(curves_key);
        let curves = refresh(&mut self.curves, curves_key, &mut self.stats.curves, || {
            build_curves(&self.picks, &self.spectrum)
        });
        refresh(&mut self.weights, weights_key, &mut self.stats.weights, || {
            build_weights(&self.spectrum, curves, &self.config)
        })
    }

    /// Normalized spectrum for the current inputs.
    pub fn normalized(&mut self) -> &SpectrumGrid {
        let curves_key = self.curves_key();
        let weights_key = self.weights_key(curves_key);
        let normalized_key = key_of(&(weights_key, &self.spectrum));
        let curves = refresh(&mut self.curves, curves_key, &mut self.stats.curves, || {
            build_curves(&self.picks, &self.spectrum)
        });
        let weights = refresh(&mut self.weights, weights_key, &mut self.stats.weights, || {
            build_weights(&self.spectrum, curves, &self.config)
        });
        refresh(
            &mut self.normalized,
            normalized_key,
            &mut self.stats.normalized,
            || {
                log::debug!(
                    "Recomputing normalized spectrum ({}x{})",
                    self.spectrum.nv(),
                    self.spectrum.nf()
                );
                normalize::normalize(&self.spectrum, weights)
            },
        )
    }

    fn curves_key(&self) -> u64 {
        key_of(&(&self.picks, self.spectrum.f_axis()))
    }

    fn weights_key(&self, curves_key: u64) -> u64 {
        key_of(&(
            curves_key,
            self.spectrum.f_axis(),
            self.spectrum.v_axis(),
            &self.config,
        ))
    }
}

fn build_curves(
    picks: &[PickedPoint],
    spectrum: &SpectrumGrid,
) -> BTreeMap<ModeId, ReferenceCurve> {
    log::debug!("Recomputing reference curves ({} picks)", picks.len());
    curve::reconstruct_curves(picks, spectrum.f_axis())
}

fn build_weights(
    spectrum: &SpectrumGrid,
    curves: &BTreeMap<ModeId, ReferenceCurve>,
    config: &NormalizationConfig,
) -> WeightMatrix {
    log::debug!("Recomputing weight field (mode {})", config.mode);
    weight::weight_field(spectrum.f_axis(), spectrum.v_axis(), curves, config)
}
