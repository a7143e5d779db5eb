use crate::types::{GradientField, PhaseGrid};
use ndarray::{s, Array2, Zip};

/// Map a phase value into the principal range via `atan2(sin, cos)`
#[inline]
pub fn wrap_phase(value: f64) -> f64 {
    value.sin().atan2(value.cos())
}

/// Wrapped forward differences of a gap-free phase grid.
///
/// `dx[i, j] = wrap(g[i, j+1] - g[i, j])` and `dy[i, j] = wrap(g[i+1, j] - g[i, j])`.
/// The last column of `dx` and the last row of `dy` have no neighbor and stay
/// zero, so single-row or single-column grids get an all-zero gradient on
/// the missing axis.
pub fn wrapped_gradients(grid: &PhaseGrid) -> GradientField {
    let (rows, cols) = grid.dim();
    let mut dx = Array2::<f64>::zeros((rows, cols));
    let mut dy = Array2::<f64>::zeros((rows, cols));

    if cols > 1 {
        Zip::from(dx.slice_mut(s![.., ..cols - 1]))
            .and(grid.slice(s![.., 1..]))
            .and(grid.slice(s![.., ..cols - 1]))
            .for_each(|d, &next, &current| *d = wrap_phase(next - current));
    }

    if rows > 1 {
        Zip::from(dy.slice_mut(s![..rows - 1, ..]))
            .and(grid.slice(s![1.., ..]))
            .and(grid.slice(s![..rows - 1, ..]))
            .for_each(|d, &next, &current| *d = wrap_phase(next - current));
    }

    log::debug!("Computed wrapped gradients for {}x{} grid", rows, cols);
    GradientField { dx, dy }
}
