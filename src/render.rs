use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::color::{jet, ModePalette};
use crate::data::model::{ModeId, ReferenceCurve, SpectrumGrid};

// ---------------------------------------------------------------------------
// Spectrum image
// ---------------------------------------------------------------------------

/// Render a normalized grid as a jet-coloured image.
///
/// Frequency runs left to right, velocity bottom to top. Each cell becomes a
/// `scale × scale` block. When `curves` is given, each mode's reference
/// velocity is drawn over its frequency columns in the mode's colour.
pub fn render_spectrum(
    grid: &SpectrumGrid,
    curves: Option<&BTreeMap<ModeId, ReferenceCurve>>,
    scale: u32,
) -> RgbImage {
    let scale = scale.max(1);
    let (nv, nf) = (grid.nv() as u32, grid.nf() as u32);
    let mut img = RgbImage::new(nf * scale, nv * scale);

    for v in 0..nv {
        let row = grid.row(v as usize);
        let top = (nv - 1 - v) * scale;
        for f in 0..nf {
            fill_block(&mut img, f * scale, top, scale, jet(row[f as usize]));
        }
    }

    if let Some(curves) = curves {
        let palette = ModePalette::new(curves.keys().copied());
        for (mode, curve) in curves {
            let color = palette.color_for(*mode);
            for (f, &velocity) in curve.velocities.iter().enumerate() {
                if !in_range(velocity, grid) {
                    continue;
                }
                let v = grid.v_axis().nearest_index(velocity) as u32;
                fill_block(&mut img, f as u32 * scale, (nv - 1 - v) * scale, scale, color);
            }
        }
    }

    img
}

/// Render and write a PNG.
pub fn save_png(
    path: &Path,
    grid: &SpectrumGrid,
    curves: Option<&BTreeMap<ModeId, ReferenceCurve>>,
    scale: u32,
) -> Result<()> {
    let img = render_spectrum(grid, curves, scale);
    img.save(path)
        .with_context(|| format!("writing image {}", path.display()))?;
    log::info!(
        "Wrote {}x{} image to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}

// -- helpers --

fn fill_block(img: &mut RgbImage, x0: u32, y0: u32, size: u32, color: image::Rgb<u8>) {
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            img.put_pixel(x, y, color);
        }
    }
}

/// Curves extrapolated past the velocity axis are not drawn.
fn in_range(velocity: f64, grid: &SpectrumGrid) -> bool {
    let axis = grid.v_axis().as_slice();
    velocity.is_finite() && velocity >= axis[0] && velocity <= axis[axis.len() - 1]
}
