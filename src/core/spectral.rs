//! Spectral Poisson solver
//!
//! Solves `∇²φ = D` on a pixel grid by diagonalising the discrete Laplacian
//! with a 2D FFT. The eigenvalue grid only depends on the transform shape,
//! so it can be computed once and shared between grids of the same size.

use crate::types::{BoundaryCondition, SarError, SarResult, SpectralComplex, SpectralGrid};
use ndarray::{s, Array2, Axis, Zip};
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

/// Eigenvalues of the periodic 5-point Laplacian for one transform shape
#[derive(Debug, Clone)]
pub struct LaplacianEigenvalues {
    values: Array2<f64>,
}

impl LaplacianEigenvalues {
    /// Build `λ(i, j) = (2cos(fx[j]) - 2) + (2cos(fy[i]) - 2)` with
    /// `fx[j] = 2πj/N`, `fy[i] = 2πi/M` in FFT bin order.
    ///
    /// The only zero eigenvalue sits at (0, 0); it is replaced by 1 so the
    /// solve can divide everywhere.
    pub fn new(rows: usize, cols: usize) -> Self {
        let fx = angular_frequencies(cols);
        let fy = angular_frequencies(rows);

        let mut values = Array2::from_shape_fn((rows, cols), |(i, j)| {
            (2.0 * fx[j].cos() - 2.0) + (2.0 * fy[i].cos() - 2.0)
        });
        if rows > 0 && cols > 0 {
            values[[0, 0]] = 1.0;
        }

        Self { values }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Angular frequency of each FFT bin, negative frequencies at the wraparound indices
pub fn angular_frequencies(n: usize) -> Vec<f64> {
    let positive = n.div_ceil(2);
    (0..n)
        .map(|k| {
            let bin = if k < positive { k as f64 } else { k as f64 - n as f64 };
            2.0 * PI * bin / n as f64
        })
        .collect()
}

/// Per-shape store of eigenvalue grids.
///
/// Owned and passed explicitly by the caller; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct EigenvalueCache {
    grids: HashMap<(usize, usize), Arc<LaplacianEigenvalues>>,
}

impl EigenvalueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eigenvalue grid for a transform shape, computed on first request
    pub fn get(&mut self, shape: (usize, usize)) -> Arc<LaplacianEigenvalues> {
        self.grids
            .entry(shape)
            .or_insert_with(|| {
                log::debug!("Caching Laplacian eigenvalues for {}x{}", shape.0, shape.1);
                Arc::new(LaplacianEigenvalues::new(shape.0, shape.1))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn clear(&mut self) {
        self.grids.clear();
    }
}

/// Shape of the grid actually transformed for a given image shape
pub fn transform_shape(shape: (usize, usize), boundary: BoundaryCondition) -> (usize, usize) {
    match boundary {
        BoundaryCondition::Periodic => shape,
        BoundaryCondition::Neumann => (2 * shape.0, 2 * shape.1),
    }
}

/// Half-sample symmetric extension of a grid to twice its size in both axes
pub fn mirror_extend(grid: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = grid.dim();
    Array2::from_shape_fn((2 * rows, 2 * cols), |(i, j)| {
        let si = if i < rows { i } else { 2 * rows - 1 - i };
        let sj = if j < cols { j } else { 2 * cols - 1 - j };
        grid[[si, sj]]
    })
}

/// Outcome of a spectral solve before it is cropped to the image
#[derive(Debug, Clone)]
pub struct SpectralSolution {
    /// Real part of the inverse transform
    pub field: Array2<f64>,
    /// `max|imag| / max(1, max|real|)` of the inverse transform
    pub imaginary_residual: f64,
}

/// Solve `∇²φ = rhs` for the zero-mean φ.
///
/// `rhs` must already have the transform shape of `eigenvalues`. The zero
/// frequency coefficient of the solution is forced to zero, which fixes the
/// free additive constant.
pub fn solve_poisson(
    rhs: &Array2<f64>,
    eigenvalues: &LaplacianEigenvalues,
) -> SarResult<SpectralSolution> {
    if rhs.dim() != eigenvalues.dim() {
        return Err(SarError::Processing(format!(
            "Right-hand side {:?} does not match eigenvalue grid {:?}",
            rhs.dim(),
            eigenvalues.dim()
        )));
    }
    let (rows, cols) = rhs.dim();
    if rows == 0 || cols == 0 {
        return Err(SarError::InvalidInput("Cannot solve on an empty grid".to_string()));
    }

    let mut spectrum: SpectralGrid = rhs.mapv(|v| SpectralComplex::new(v, 0.0));
    let mut planner = FftPlanner::<f64>::new();

    fft2(&mut spectrum, &mut planner, false);

    let divide = Zip::from(&mut spectrum).and(eigenvalues.values());
    #[cfg(feature = "parallel")]
    divide.par_for_each(|c, &lambda| *c /= lambda);
    #[cfg(not(feature = "parallel"))]
    divide.for_each(|c, &lambda| *c /= lambda);
    spectrum[[0, 0]] = SpectralComplex::new(0.0, 0.0);

    fft2(&mut spectrum, &mut planner, true);

    let scale = 1.0 / (rows * cols) as f64;
    let mut max_real = 0.0f64;
    let mut max_imag = 0.0f64;
    let field = spectrum.mapv(|c| {
        let c = c * scale;
        max_real = max_real.max(c.re.abs());
        max_imag = max_imag.max(c.im.abs());
        c.re
    });

    Ok(SpectralSolution {
        field,
        imaginary_residual: max_imag / max_real.max(1.0),
    })
}

/// In-place unnormalised 2D FFT, rows first then columns
fn fft2(data: &mut SpectralGrid, planner: &mut FftPlanner<f64>, inverse: bool) {
    let (rows, cols) = data.dim();
    let row_fft = plan(planner, cols, inverse);
    let col_fft = plan(planner, rows, inverse);

    transform_lanes(data, Axis(1), row_fft.as_ref());
    transform_lanes(data, Axis(0), col_fft.as_ref());
}

fn plan(planner: &mut FftPlanner<f64>, len: usize, inverse: bool) -> Arc<dyn Fft<f64>> {
    if inverse {
        planner.plan_fft_inverse(len)
    } else {
        planner.plan_fft_forward(len)
    }
}

/// Apply a 1D transform along every lane of `axis`
fn transform_lanes(data: &mut SpectralGrid, axis: Axis, fft: &dyn Fft<f64>) {
    let len = data.len_of(axis);
    let mut buffer = vec![SpectralComplex::new(0.0, 0.0); len];
    let mut scratch = vec![SpectralComplex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (v, b) in lane.iter_mut().zip(buffer.iter()) {
            *v = *b;
        }
    }
}

/// Top-left `rows x cols` block of a solved field
pub fn crop(field: &Array2<f64>, rows: usize, cols: usize) -> Array2<f64> {
    field.slice(s![..rows, ..cols]).to_owned()
}
