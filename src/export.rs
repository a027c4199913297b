use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::NormalizationConfig;
use crate::data::model::{Axis, ModeId, ReferenceCurve, SpectrumGrid};
use crate::pipeline::weight::half_width;

// ---------------------------------------------------------------------------
// Matrix text export
// ---------------------------------------------------------------------------

/// Line orientation of the text export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixLayout {
    /// One line per velocity sample, same orientation as the input table.
    #[default]
    VelocityRows,
    /// One line per frequency column.
    FrequencyRows,
}

/// Format a grid as lines of space-separated values with six decimals.
pub fn format_matrix(grid: &SpectrumGrid, layout: MatrixLayout) -> String {
    let mut out = String::new();
    let mut push_line = |values: &mut dyn Iterator<Item = f64>| {
        let mut first = true;
        for x in values {
            if !first {
                out.push(' ');
            }
            first = false;
            let _ = write!(out, "{x:.6}");
        }
        out.push('\n');
    };
    match layout {
        MatrixLayout::VelocityRows => {
            for row in grid.rows() {
                push_line(&mut row.iter().copied());
            }
        }
        MatrixLayout::FrequencyRows => {
            for f in 0..grid.nf() {
                push_line(&mut grid.column(f));
            }
        }
    }
    out
}

pub fn write_matrix(path: &Path, grid: &SpectrumGrid, layout: MatrixLayout) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(format_matrix(grid, layout).as_bytes())
        .and_then(|()| writer.flush())
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {}x{} matrix to {}", grid.nv(), grid.nf(), path.display());
    Ok(())
}

/// File name used when the caller does not pick one.
pub fn default_output_name(config: &NormalizationConfig) -> String {
    format!("normalized_spectrum_sigma_{}.txt", config.sigma_factor)
}

// ---------------------------------------------------------------------------
// Curve overlay
// ---------------------------------------------------------------------------

/// One sample of a reference curve with its acceptance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    pub frequency: f64,
    pub velocity: f64,
    pub v_lower: f64,
    pub v_upper: f64,
    pub extrapolated: bool,
}

/// Ordered `(frequency, velocity)` path of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveOverlay {
    pub mode: ModeId,
    pub points: Vec<OverlayPoint>,
}

/// Pair every curve sample with its frequency and kernel band
/// `velocity ± half_width(f)`.
pub fn curve_overlay(
    curves: &BTreeMap<ModeId, ReferenceCurve>,
    f_axis: &Axis,
    config: &NormalizationConfig,
) -> Vec<CurveOverlay> {
    let f_max = f_axis.max();
    curves
        .values()
        .map(|curve| CurveOverlay {
            mode: curve.mode,
            points: f_axis
                .as_slice()
                .iter()
                .zip(curve.velocities.iter().zip(&curve.extrapolated))
                .map(|(&frequency, (&velocity, &extrapolated))| {
                    let hw = half_width(frequency, f_max, &config.kernel, config.sigma_factor);
                    OverlayPoint {
                        frequency,
                        velocity,
                        v_lower: velocity - hw,
                        v_upper: velocity + hw,
                        extrapolated,
                    }
                })
                .collect(),
        })
        .collect()
}

pub fn write_overlay_json(path: &Path, overlay: &[CurveOverlay]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), overlay)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote overlay for {} mode(s) to {}", overlay.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpectrumGrid {
        SpectrumGrid::from_rows(
            vec![vec![0.0, 1.0, 0.25], vec![1.0, 0.5, 1.0 / 3.0]],
            Axis::linspace("frequency", 0.0, 0.8, 3).unwrap(),
            Axis::linspace("velocity", 2.5, 5.0, 2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn velocity_rows_keep_input_orientation() {
        let text = format_matrix(&grid(), MatrixLayout::VelocityRows);
        assert_eq!(
            text,
            "0.000000 1.000000 0.250000\n1.000000 0.500000 0.333333\n"
        );
    }

    #[test]
    fn frequency_rows_transpose() {
        let text = format_matrix(&grid(), MatrixLayout::FrequencyRows);
        assert_eq!(
            text,
            "0.000000 1.000000\n1.000000 0.500000\n0.250000 0.333333\n"
        );
    }

    #[test]
    fn default_name_carries_sigma() {
        let config = NormalizationConfig::default();
        assert_eq!(default_output_name(&config), "normalized_spectrum_sigma_0.5.txt");
    }

    #[test]
    fn overlay_band_follows_kernel_width() {
        let f_axis = Axis::linspace("frequency", 0.0, 0.8, 3).unwrap();
        let curves: BTreeMap<ModeId, ReferenceCurve> = [(
            1,
            ReferenceCurve {
                mode: 1,
                velocities: vec![3.0, 3.5, 4.0],
                extrapolated: vec![true, false, false],
            },
        )]
        .into_iter()
        .collect();
        let config = NormalizationConfig::default();
        let overlay = curve_overlay(&curves, &f_axis, &config);

        assert_eq!(overlay.len(), 1);
        let points = &overlay[0].points;
        assert_eq!(points.len(), 3);
        assert!(points[0].extrapolated);
        let low_band = points[0].v_upper - points[0].v_lower;
        let high_band = points[2].v_upper - points[2].v_lower;
        assert!(low_band > high_band);
        assert!((low_band - 2.0 * config.kernel.base_wide * config.sigma_factor).abs() < 1e-12);

        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json[0]["mode"], 1);
        assert_eq!(json[0]["points"][1]["extrapolated"], false);
    }
}
