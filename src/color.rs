use std::collections::BTreeMap;

use image::Rgb;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ModeId;

// ---------------------------------------------------------------------------
// Jet transfer function
// ---------------------------------------------------------------------------

/// Map a normalized value in `[0, 1]` onto the jet colour scale
/// (dark blue → cyan → yellow → dark red). Out-of-range input is clamped.
pub fn jet(value: f64) -> Rgb<u8> {
    let x = if value.is_finite() {
        value.clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    let channel = |offset: f32| (4.0 * x + offset).min(-4.0 * x + 3.0 - offset).clamp(0.0, 1.0);
    let rgb: Srgb<u8> = Srgb::new(channel(-1.5), channel(-0.5), channel(0.5)).into_format();
    Rgb([rgb.red, rgb.green, rgb.blue])
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Rgb([rgb.red, rgb.green, rgb.blue])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mode colours for curve overlays
// ---------------------------------------------------------------------------

/// Assigns each mode id a distinct overlay colour.
#[derive(Debug, Clone)]
pub struct ModePalette {
    mapping: BTreeMap<ModeId, Rgb<u8>>,
    default_color: Rgb<u8>,
}

impl ModePalette {
    pub fn new(modes: impl IntoIterator<Item = ModeId>) -> Self {
        let modes: Vec<ModeId> = modes.into_iter().collect();
        let palette = generate_palette(modes.len());
        ModePalette {
            mapping: modes.into_iter().zip(palette).collect(),
            default_color: Rgb([255, 255, 255]),
        }
    }

    pub fn color_for(&self, mode: ModeId) -> Rgb<u8> {
        self.mapping.get(&mode).copied().unwrap_or(self.default_color)
    }
}
