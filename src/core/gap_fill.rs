use crate::types::{GapMask, PhaseGrid, SarError, SarResult};
use ndarray::{Array2, Zip};

/// Replace no-data pixels with the mean of all finite pixels.
///
/// Grids without gaps are returned unchanged. A grid with no finite pixel at
/// all cannot be filled and is rejected.
pub fn fill_gaps(wrapped: &PhaseGrid) -> SarResult<PhaseGrid> {
    let (rows, cols) = wrapped.dim();
    if rows == 0 || cols == 0 {
        return Err(SarError::InvalidInput(format!(
            "Phase grid {}x{} is empty", rows, cols
        )));
    }

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for &value in wrapped.iter() {
        if value.is_finite() {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        return Err(SarError::InvalidInput(
            "Phase grid contains no finite values".to_string(),
        ));
    }

    let total = rows * cols;
    if count == total {
        return Ok(wrapped.clone());
    }

    let fill_value = sum / count as f64;
    log::warn!(
        "Filling {} of {} pixels with mean phase {:.6} rad",
        total - count,
        total,
        fill_value
    );

    Ok(wrapped.mapv(|v| if v.is_finite() { v } else { fill_value }))
}

/// Mask of pixels that carry no usable phase (NaN or infinite)
pub fn nan_mask(grid: &PhaseGrid) -> GapMask {
    grid.mapv(|v| !v.is_finite())
}

/// Set every masked pixel of `grid` to NaN.
///
/// The unwrapper never remasks its own output; callers that need the
/// original gaps back pass the mask taken before unwrapping.
pub fn apply_nan_mask(grid: &PhaseGrid, mask: &GapMask) -> SarResult<PhaseGrid> {
    if grid.dim() != mask.dim() {
        return Err(SarError::InvalidInput(format!(
            "Mask shape {:?} does not match grid shape {:?}",
            mask.dim(),
            grid.dim()
        )));
    }

    let zip = Zip::from(grid).and(mask);
    #[cfg(feature = "parallel")]
    let masked: Array2<f64> = zip.par_map_collect(|&v, &gap| if gap { f64::NAN } else { v });
    #[cfg(not(feature = "parallel"))]
    let masked: Array2<f64> = zip.map_collect(|&v, &gap| if gap { f64::NAN } else { v });
    Ok(masked)
}
