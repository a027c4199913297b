use std::collections::BTreeMap;

use seisnorm::config::{KernelParams, NormalizationConfig, NormalizationMode};
use seisnorm::data::loader::{parse_picks, parse_spectrum};
use seisnorm::data::model::{Axis, PickedPoint, SpectrumGrid, WeightMatrix};
use seisnorm::pipeline::curve::{reconstruct_curves, reconstruct_mode, LinearFit};
use seisnorm::pipeline::normalize::{column_maxima, normalize_simple, try_normalize};
use seisnorm::pipeline::weight::{half_width, weight_field};
use seisnorm::pipeline;
use seisnorm::NormError;

// ============================================================================
// Helpers
// ============================================================================

fn scenario_grid() -> SpectrumGrid {
    SpectrumGrid::from_rows(
        vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]],
        Axis::new("frequency", vec![0.0, 0.4, 0.8]).unwrap(),
        Axis::new("velocity", vec![2.5, 3.75, 5.0]).unwrap(),
    )
    .unwrap()
}

/// Two dispersive branches on a 40 x 30 grid with a noisy floor.
fn synthetic_grid() -> SpectrumGrid {
    let f_axis = Axis::linspace("frequency", 0.0, 0.8, 30).unwrap();
    let v_axis = Axis::linspace("velocity", 2.5, 5.0, 40).unwrap();
    let mut rows = Vec::new();
    for (j, &v) in v_axis.as_slice().iter().enumerate() {
        let row: Vec<f64> = f_axis
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let b0 = 4.5 - 1.5 * f;
                let b1 = 4.9 - 0.8 * f;
                let signal = (-((v - b0) / 0.1).powi(2)).exp()
                    + 0.5 * (-((v - b1) / 0.1).powi(2)).exp();
                signal + 0.01 * ((i * 7 + j * 13) % 11) as f64
            })
            .collect();
        rows.push(row);
    }
    SpectrumGrid::from_rows(rows, f_axis, v_axis).unwrap()
}

fn synthetic_picks() -> Vec<PickedPoint> {
    let mut picks = Vec::new();
    for k in 0..8 {
        let f = 0.2 + 0.05 * k as f64;
        picks.push(PickedPoint::new(f, 4.5 - 1.5 * f, 0));
        picks.push(PickedPoint::new(f + 0.01, 4.9 - 0.8 * (f + 0.01), 1));
    }
    // Unordered on purpose.
    picks.reverse();
    picks
}

fn all_modes() -> [NormalizationMode; 3] {
    [
        NormalizationMode::Simple,
        NormalizationMode::WeightedGaussian,
        NormalizationMode::WeightedTriangular,
    ]
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn simple_scenario_three_by_three() {
    let grid = scenario_grid();
    let picks = vec![
        PickedPoint::new(0.0, 2.5, 0),
        PickedPoint::new(0.4, 3.75, 0),
        PickedPoint::new(0.8, 5.0, 0),
    ];
    let out = pipeline::run(&grid, &picks, &NormalizationConfig::simple());

    assert_eq!(column_maxima(&out.normalized), vec![1.0, 1.0, 1.0]);
    let col0: Vec<f64> = out.normalized.column(0).collect();
    assert_eq!(col0, vec![1.0 / 7.0, 4.0 / 7.0, 1.0]);
}

#[test]
fn single_pick_gives_constant_curve() {
    let f_axis = Axis::linspace("frequency", 0.0, 0.8, 25).unwrap();
    let curves = reconstruct_curves(&[PickedPoint::new(0.37, 3.9, 4)], &f_axis);
    let curve = &curves[&4];
    assert_eq!(curve.len(), 25);
    assert!(curve.velocities.iter().all(|&v| v == 3.9));
}

#[test]
fn duplicate_pick_frequencies_return_first_velocity() {
    let f_axis = Axis::new("frequency", vec![0.1, 0.3, 0.5]).unwrap();
    let picks = vec![
        PickedPoint::new(0.3, 3.2, 0),
        PickedPoint::new(0.3, 3.8, 0),
        PickedPoint::new(0.5, 4.0, 0),
        PickedPoint::new(0.1, 3.0, 0),
    ];
    let curve = &reconstruct_curves(&picks, &f_axis)[&0];
    assert!(curve.velocities.iter().all(|v| v.is_finite()));
    assert_eq!(curve.velocities[1], 3.2);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn every_column_peaks_at_one_or_is_zero() {
    let grid = synthetic_grid();
    let picks = synthetic_picks();
    for mode in all_modes() {
        for sigma in [0.2, 0.5, 1.0, 2.0] {
            let config = NormalizationConfig::new(mode, sigma).unwrap();
            let out = pipeline::run(&grid, &picks, &config);
            for (f, max) in column_maxima(&out.normalized).into_iter().enumerate() {
                assert_eq!(max, 1.0, "{mode} sigma {sigma} column {f}");
            }
        }
    }

    let zero_col = SpectrumGrid::from_rows(
        vec![vec![0.0, 3.0], vec![0.0, 1.0]],
        Axis::linspace("frequency", 0.0, 0.8, 2).unwrap(),
        Axis::linspace("velocity", 2.5, 5.0, 2).unwrap(),
    )
    .unwrap();
    let out = pipeline::run(&zero_col, &synthetic_picks(), &NormalizationConfig::default());
    assert_eq!(column_maxima(&out.normalized), vec![0.0, 1.0]);
}

#[test]
fn curve_off_the_velocity_axis_keeps_columns_alive() {
    let grid = SpectrumGrid::from_rows(
        vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]],
        Axis::linspace("frequency", 0.0, 0.8, 2).unwrap(),
        Axis::linspace("velocity", 2.5, 5.0, 3).unwrap(),
    )
    .unwrap();
    let picks = [PickedPoint::new(0.4, 10.0, 0)];

    for mode in [
        NormalizationMode::WeightedGaussian,
        NormalizationMode::WeightedTriangular,
    ] {
        let config = NormalizationConfig::new(mode, 0.5).unwrap();
        let out = pipeline::run(&grid, &picks, &config);
        assert_eq!(column_maxima(&out.normalized), vec![1.0, 1.0], "{mode}");
        // Only the background floor applies, so the result matches Simple.
        let simple = normalize_simple(&grid);
        for (a, b) in out.normalized.as_slice().iter().zip(simple.as_slice()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    let silent = KernelParams {
        background: 0.0,
        ..KernelParams::default()
    };
    assert!(matches!(
        NormalizationConfig::new(NormalizationMode::WeightedTriangular, 0.5)
            .unwrap()
            .with_kernel(silent),
        Err(NormError::InvalidConfig(_))
    ));
}

#[test]
fn curve_length_matches_frequency_axis() {
    for nf in [1, 2, 7, 64] {
        let f_axis = Axis::linspace("frequency", 0.0, 0.8, nf).unwrap();
        let curves = reconstruct_curves(&synthetic_picks(), &f_axis);
        for curve in curves.values() {
            assert_eq!(curve.velocities.len(), nf);
            assert_eq!(curve.extrapolated.len(), nf);
        }
    }
}

#[test]
fn interpolation_is_exact_at_picks() {
    let picks = synthetic_picks();
    let mut freqs: Vec<f64> = picks.iter().filter(|p| p.mode == 0).map(|p| p.frequency).collect();
    freqs.sort_by(f64::total_cmp);
    let f_axis = Axis::new("frequency", freqs).unwrap();
    let curve = &reconstruct_curves(&picks, &f_axis)[&0];

    for p in picks.iter().filter(|p| p.mode == 0) {
        let i = f_axis.as_slice().iter().position(|&f| f == p.frequency).unwrap();
        assert_eq!(curve.velocities[i], p.velocity);
        assert!(!curve.extrapolated[i]);
    }
}

#[test]
fn extrapolation_below_range_is_linear() {
    let points = [(0.3, 3.9), (0.35, 3.7), (0.4, 3.65), (0.5, 3.4), (0.6, 3.3)];
    let f_axis = Axis::new("frequency", vec![0.0, 0.05, 0.1, 0.2]).unwrap();
    let curve = reconstruct_mode(0, &points, &f_axis);
    let slope = LinearFit::fit(&points).slope;

    let f = f_axis.as_slice();
    for a in 0..f.len() {
        for b in a + 1..f.len() {
            let dv = curve.velocities[b] - curve.velocities[a];
            assert!((dv - slope * (f[b] - f[a])).abs() < 1e-9);
        }
    }
}

#[test]
fn simple_mode_equals_identity_weights() {
    let grid = synthetic_grid();
    let simple = pipeline::run(&grid, &synthetic_picks(), &NormalizationConfig::simple());
    let identity = try_normalize(&grid, &WeightMatrix::ones(grid.nv(), grid.nf())).unwrap();
    assert_eq!(simple.normalized, identity);
    assert_eq!(simple.normalized, normalize_simple(&grid));
}

#[test]
fn sigma_widens_kernel_and_weights() {
    let grid = synthetic_grid();
    let curves = reconstruct_curves(&synthetic_picks(), grid.f_axis());
    let f_max = grid.f_axis().max();

    for mode in [
        NormalizationMode::WeightedGaussian,
        NormalizationMode::WeightedTriangular,
    ] {
        let small = NormalizationConfig::new(mode, 0.4).unwrap();
        let large = NormalizationConfig::new(mode, 0.9).unwrap();

        for &f in grid.f_axis().as_slice() {
            assert!(
                half_width(f, f_max, &large.kernel, large.sigma_factor)
                    > half_width(f, f_max, &small.kernel, small.sigma_factor)
            );
        }

        let w_small = weight_field(grid.f_axis(), grid.v_axis(), &curves, &small);
        let w_large = weight_field(grid.f_axis(), grid.v_axis(), &curves, &large);
        for (a, b) in w_small.as_slice().iter().zip(w_large.as_slice()) {
            assert!(b >= a);
        }
    }
}

#[test]
fn weighting_suppresses_energy_away_from_picks() {
    let grid = synthetic_grid();
    let picks: Vec<PickedPoint> = synthetic_picks().into_iter().filter(|p| p.mode == 0).collect();
    let out = pipeline::run(&grid, &picks, &NormalizationConfig::default());
    let simple = normalize_simple(&grid);

    // At the top of the velocity axis, far from mode 0, weighted energy drops.
    let top = grid.nv() - 1;
    for f in 0..grid.nf() {
        assert!(out.normalized.get(top, f) <= simple.get(top, f));
    }
}

#[test]
fn output_is_deterministic_under_pick_order() {
    let grid = synthetic_grid();
    let picks = synthetic_picks();
    let mut shuffled = picks.clone();
    shuffled.rotate_left(5);

    let config = NormalizationConfig::new(NormalizationMode::WeightedTriangular, 0.7).unwrap();
    let a = pipeline::run(&grid, &picks, &config);
    let b = pipeline::run(&grid, &shuffled, &config);
    assert_eq!(a.curves, b.curves);
    assert_eq!(a.normalized, b.normalized);
    assert_eq!(a.curves.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
}

// ============================================================================
// Input rejection
// ============================================================================

#[test]
fn malformed_tables_are_rejected_wholesale() {
    assert!(matches!(
        parse_spectrum("1 2 3\n4 5 6\n7 8").unwrap_err(),
        NormError::RaggedRow { row: 3, .. }
    ));
    assert!(matches!(parse_spectrum("").unwrap_err(), NormError::EmptyInput(_)));
    assert!(matches!(
        parse_spectrum("1 2\n3 four").unwrap_err(),
        NormError::MalformedInput { line: 2, .. }
    ));
}

#[test]
fn parsed_inputs_feed_the_pipeline() {
    let rows = parse_spectrum("1 2 3\n4 5 6\n7 8 9\n").unwrap();
    let grid = SpectrumGrid::from_rows(
        rows,
        Axis::linspace("frequency", 0.0, 0.8, 3).unwrap(),
        Axis::linspace("velocity", 2.5, 5.0, 3).unwrap(),
    )
    .unwrap();
    assert_eq!(grid, scenario_grid());

    let picks = parse_picks("0 2.5\n0.4 3.75\n0.8 5.0\n").unwrap();
    assert!(picks.iter().all(|p| p.mode == 0));

    let out = pipeline::run(&grid, &picks, &NormalizationConfig::default());
    let maxima: BTreeMap<usize, f64> = column_maxima(&out.normalized).into_iter().enumerate().collect();
    assert!(maxima.values().all(|&m| m == 1.0));
    // The picked curve passes through each column's peak cell.
    for f in 0..3 {
        assert_eq!(out.normalized.get(f, f), 1.0);
    }
}
