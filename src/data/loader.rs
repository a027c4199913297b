use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Axis, ModeId, PickedPoint, SpectrumGrid};
use crate::error::NormError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dispersion image from a whitespace-separated text table.
///
/// One line per velocity sample, one column per frequency sample. Axis
/// values are not stored in the file; the caller supplies them.
pub fn load_spectrum(path: &Path, f_axis: Axis, v_axis: Axis) -> Result<SpectrumGrid> {
    let rows = read_table(path)?;
    let grid = SpectrumGrid::from_rows(rows, f_axis, v_axis)
        .with_context(|| format!("spectrum file {}", path.display()))?;
    log::info!(
        "Loaded spectrum {} ({} velocities x {} frequencies)",
        path.display(),
        grid.nv(),
        grid.nf()
    );
    Ok(grid)
}

/// Load a dispersion image whose axes span the given `(min, max)` ranges
/// evenly, with as many samples as the table has columns / rows.
pub fn load_spectrum_in_ranges(
    path: &Path,
    f_range: (f64, f64),
    v_range: (f64, f64),
) -> Result<SpectrumGrid> {
    let rows = read_table(path)?;
    let (nv, nf) = (rows.len(), rows[0].len());
    let f_axis = Axis::linspace("frequency", f_range.0, f_range.1, nf)?;
    let v_axis = Axis::linspace("velocity", v_range.0, v_range.1, nv)?;
    let grid = SpectrumGrid::from_rows(rows, f_axis, v_axis)
        .with_context(|| format!("spectrum file {}", path.display()))?;
    log::info!(
        "Loaded spectrum {} ({nv} velocities x {nf} frequencies, f {:?}, v {:?})",
        path.display(),
        f_range,
        v_range
    );
    Ok(grid)
}

/// Load picked dispersion points, one `frequency velocity [mode]` per line.
pub fn load_picks(path: &Path) -> Result<Vec<PickedPoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading picks file {}", path.display()))?;
    let picks =
        parse_picks(&text).with_context(|| format!("parsing picks file {}", path.display()))?;
    log::info!("Loaded {} picks from {}", picks.len(), path.display());
    Ok(picks)
}

fn read_table(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading spectrum file {}", path.display()))?;
    let rows = parse_spectrum(&text)
        .with_context(|| format!("parsing spectrum file {}", path.display()))?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Spectrum table
// ---------------------------------------------------------------------------

/// Parse a rectangular table. Leading and trailing blank lines are ignored;
/// a blank line inside the table, a non-numeric token or a row of the wrong
/// length rejects the whole input.
pub fn parse_spectrum(text: &str) -> Result<Vec<Vec<f64>>, NormError> {
    let lines = content_lines(text);
    if lines.is_empty() {
        return Err(NormError::EmptyInput("spectrum"));
    }

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(lines.len());
    for (line_no, line) in lines {
        let row = line
            .split_whitespace()
            .map(|tok| parse_number(tok, line_no))
            .collect::<Result<Vec<f64>, NormError>>()?;

        if row.is_empty() {
            return Err(NormError::malformed(line_no, "empty row"));
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(NormError::RaggedRow {
                    row: line_no,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Pick list
// ---------------------------------------------------------------------------

/// Parse `frequency velocity [mode]` lines. A missing mode means mode 0.
/// An empty input yields no picks.
pub fn parse_picks(text: &str) -> Result<Vec<PickedPoint>, NormError> {
    content_lines(text)
        .into_iter()
        .map(|(line_no, line)| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [f, v] => Ok(PickedPoint::new(
                    parse_number(f, line_no)?,
                    parse_number(v, line_no)?,
                    0,
                )),
                [f, v, m] => Ok(PickedPoint::new(
                    parse_number(f, line_no)?,
                    parse_number(v, line_no)?,
                    parse_mode(m, line_no)?,
                )),
                [] => Err(NormError::malformed(line_no, "empty row")),
                _ => Err(NormError::malformed(
                    line_no,
                    format!("expected 2 or 3 values, found {}", tokens.len()),
                )),
            }
        })
        .collect()
}

// -- helpers --

/// Lines between the first and last non-blank line, with 1-based file line
/// numbers.
fn content_lines(text: &str) -> Vec<(usize, &str)> {
    let lines: Vec<(usize, &str)> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
    fn is_content(line: &(usize, &str)) -> bool {
        !line.1.trim().is_empty()
    }
    match (lines.iter().position(is_content), lines.iter().rposition(is_content)) {
        (Some(first), Some(last)) => lines[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

fn parse_number(tok: &str, line: usize) -> Result<f64, NormError> {
    match tok.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(NormError::malformed(line, format!("'{tok}' is not a number"))),
    }
}

/// Mode ids may be written as `1` or `1.0`.
fn parse_mode(tok: &str, line: usize) -> Result<ModeId, NormError> {
    if let Ok(id) = tok.parse::<ModeId>() {
        return Ok(id);
    }
    let x = parse_number(tok, line)?;
    if x.fract() != 0.0 || x < ModeId::MIN as f64 || x >= ModeId::MAX as f64 {
        return Err(NormError::malformed(
            line,
            format!("'{tok}' is not an integer mode id"),
        ));
    }
    Ok(x as ModeId)
}
