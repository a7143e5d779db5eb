use approx::assert_abs_diff_eq;
use ndarray::Array2;
use sarphase::core::{apply_nan_mask, nan_mask, wrap_phase};
use sarphase::{unwrap_phase_fft, BoundaryCondition, PhaseUnwrapper, SarError, UnwrapParams};
use std::f64::consts::PI;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_recovers(phi: &Array2<f64>, unwrapped: &Array2<f64>, epsilon: f64) {
    assert_eq!(phi.dim(), unwrapped.dim());
    let mean = phi.mean().unwrap();
    for ((idx, got), want) in unwrapped.indexed_iter().zip(phi.iter()) {
        assert!(
            (got - (want - mean)).abs() < epsilon,
            "pixel {:?}: got {}, expected {}",
            idx,
            got,
            want - mean
        );
    }
}

#[test]
fn test_ramp_4x4_scenario() -> anyhow::Result<()> {
    init_logging();

    let phi = Array2::from_shape_fn((4, 4), |(i, j)| 0.3 * i as f64 + 0.2 * j as f64);
    let wrapped = phi.mapv(wrap_phase);
    let unwrapped = unwrap_phase_fft(&wrapped)?;

    assert_recovers(&phi, &unwrapped, 1e-9);
    Ok(())
}

#[test]
fn test_constant_4x4_scenario() -> anyhow::Result<()> {
    init_logging();

    let grid = Array2::<f64>::from_elem((4, 4), 1.5);
    let unwrapped = unwrap_phase_fft(&grid)?;
    assert_eq!(unwrapped.dim(), (4, 4));
    for v in unwrapped.iter() {
        assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_all_zero_grid() -> anyhow::Result<()> {
    let grid = Array2::<f64>::zeros((7, 5));
    for boundary in [BoundaryCondition::Neumann, BoundaryCondition::Periodic] {
        let unwrapper = PhaseUnwrapper::with_params(UnwrapParams {
            boundary,
            ..UnwrapParams::default()
        });
        let unwrapped = unwrapper.unwrap(&grid)?;
        assert!(unwrapped.iter().all(|&v| v.abs() < 1e-15));
    }
    Ok(())
}

#[test]
fn test_multi_cycle_smooth_field() -> anyhow::Result<()> {
    init_logging();

    // Spans several 2π cycles; neighbor steps stay well below π
    let (rows, cols) = (64, 48);
    let phi = Array2::from_shape_fn((rows, cols), |(i, j)| {
        8.0 * (PI * i as f64 / rows as f64).sin() * (PI * j as f64 / (2.0 * cols as f64)).cos()
            + 0.15 * j as f64
    });
    let wrapped = phi.mapv(wrap_phase);
    assert!(wrapped.iter().all(|v| v.abs() <= PI + 1e-12));

    let unwrapped = unwrap_phase_fft(&wrapped)?;
    assert_recovers(&phi, &unwrapped, 1e-9);
    Ok(())
}

#[test]
fn test_degenerate_shapes() -> anyhow::Result<()> {
    let row = Array2::from_shape_fn((1, 9), |(_, j)| 0.7 * j as f64);
    let unwrapped = unwrap_phase_fft(&row.mapv(wrap_phase))?;
    assert_recovers(&row, &unwrapped, 1e-9);

    let column = Array2::from_shape_fn((6, 1), |(i, _)| -0.9 * i as f64);
    let unwrapped = unwrap_phase_fft(&column.mapv(wrap_phase))?;
    assert_recovers(&column, &unwrapped, 1e-9);

    let periodic = PhaseUnwrapper::with_params(UnwrapParams {
        boundary: BoundaryCondition::Periodic,
        ..UnwrapParams::default()
    });
    let unwrapped = periodic.unwrap(&row)?;
    assert_eq!(unwrapped.dim(), (1, 9));
    assert!(unwrapped.iter().all(|v| v.is_finite()));
    Ok(())
}

#[test]
fn test_interior_gap_only_shifts_far_field() -> anyhow::Result<()> {
    init_logging();

    let (rows, cols) = (24, 24);
    let truth = Array2::from_shape_fn((rows, cols), |(i, j)| {
        0.8 * (0.2 * i as f64).sin() + 0.5 * (0.15 * j as f64).cos()
    });
    let hole = (11, 12);
    let mut gappy = truth.clone();
    gappy[hole] = f64::NAN;

    let reference = unwrap_phase_fft(&truth)?;
    let filled = unwrap_phase_fft(&gappy)?;

    // Far from the hole the two solutions differ by one common offset
    let far: Vec<f64> = reference
        .indexed_iter()
        .filter(|((i, j), _)| i.abs_diff(hole.0) + j.abs_diff(hole.1) >= 6)
        .map(|(idx, &v)| filled[idx] - v)
        .collect();
    let offset = far[0];
    for d in &far {
        assert_abs_diff_eq!(*d, offset, epsilon = 1e-9);
    }
    assert!(offset.abs() < 2.0 / (rows * cols) as f64);

    let remasked = apply_nan_mask(&filled, &nan_mask(&gappy))?;
    assert!(remasked[hole].is_nan());
    assert_eq!(remasked.iter().filter(|v| v.is_nan()).count(), 1);
    Ok(())
}

#[test]
fn test_input_offset_by_full_cycles_is_ignored() -> anyhow::Result<()> {
    let phi = Array2::from_shape_fn((5, 7), |(i, j)| 0.4 * i as f64 - 0.25 * j as f64);
    let shifted = Array2::from_shape_fn((5, 7), |(i, j)| {
        phi[[i, j]] + 2.0 * PI * ((i + 2 * j) % 3) as f64
    });

    let a = unwrap_phase_fft(&phi)?;
    let b = unwrap_phase_fft(&shifted)?;
    for (x, y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_invalid_inputs() {
    let all_nan = Array2::<f64>::from_elem((3, 4), f64::NAN);
    assert!(matches!(unwrap_phase_fft(&all_nan), Err(SarError::InvalidInput(_))));

    let empty = Array2::<f64>::zeros((0, 0));
    assert!(matches!(unwrap_phase_fft(&empty), Err(SarError::InvalidInput(_))));

    let no_columns = Array2::<f64>::zeros((5, 0));
    assert!(matches!(unwrap_phase_fft(&no_columns), Err(SarError::InvalidInput(_))));
}

#[test]
fn test_instability_error_message() {
    let err = SarError::NumericalInstability {
        residual: 1e-3,
        tolerance: 1e-6,
    };
    let message = format!("{}", err);
    assert!(message.contains("imaginary residual"));
    assert!(message.contains("1e-3"));
}

#[test]
fn test_zero_tolerance_reports_imaginary_residual() -> anyhow::Result<()> {
    init_logging();

    let phi = Array2::from_shape_fn((9, 7), |(i, j)| 0.9 * i as f64 + 0.6 * j as f64);
    let wrapped = phi.mapv(wrap_phase);

    let strict = PhaseUnwrapper::with_params(UnwrapParams {
        imaginary_tolerance: 0.0,
        ..UnwrapParams::default()
    });
    match strict.unwrap(&wrapped) {
        Err(SarError::NumericalInstability { residual, tolerance }) => {
            assert!(residual > 0.0);
            assert!(residual < 1e-12);
            assert_eq!(tolerance, 0.0);
        }
        other => panic!("expected NumericalInstability, got {:?}", other),
    }

    // Same grid passes under the default tolerance
    let unwrapped = PhaseUnwrapper::new().unwrap(&wrapped)?;
    assert_recovers(&phi, &unwrapped, 1e-9);
    Ok(())
}
