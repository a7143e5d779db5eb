use crate::core::divergence::divergence;
use crate::core::gap_fill::fill_gaps;
use crate::core::gradient::wrapped_gradients;
use crate::core::spectral::{
    crop, mirror_extend, solve_poisson, transform_shape, EigenvalueCache, LaplacianEigenvalues,
};
use crate::types::{BoundaryCondition, PhaseGrid, SarError, SarResult};
use serde::{Deserialize, Serialize};

/// Phase unwrapping parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwrapParams {
    /// Edge treatment of the Poisson solve
    pub boundary: BoundaryCondition,
    /// Largest accepted `max|imag| / max(1, max|real|)` after the inverse transform
    pub imaginary_tolerance: f64,
}

impl Default for UnwrapParams {
    fn default() -> Self {
        Self {
            boundary: BoundaryCondition::Neumann,
            imaginary_tolerance: 1e-6,
        }
    }
}

/// Least-squares phase unwrapper.
///
/// Pipeline: gap filling, wrapped gradients, divergence, spectral Poisson
/// solve, result assembly. The output has zero spatial mean and the same
/// shape as the input. Gaps are filled but not re-applied; see
/// [`crate::core::apply_nan_mask`].
#[derive(Debug, Clone)]
pub struct PhaseUnwrapper {
    params: UnwrapParams,
}

impl PhaseUnwrapper {
    /// Create an unwrapper with default parameters
    pub fn new() -> Self {
        Self {
            params: UnwrapParams::default(),
        }
    }

    /// Create an unwrapper with custom parameters
    pub fn with_params(params: UnwrapParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &UnwrapParams {
        &self.params
    }

    /// Unwrap one grid, computing the eigenvalue grid on the fly
    pub fn unwrap(&self, wrapped: &PhaseGrid) -> SarResult<PhaseGrid> {
        self.validate(wrapped)?;
        let (rows, cols) = transform_shape(wrapped.dim(), self.params.boundary);
        let eigenvalues = LaplacianEigenvalues::new(rows, cols);
        self.run(wrapped, &eigenvalues)
    }

    /// Unwrap one grid, reusing eigenvalue grids held in `cache`
    pub fn unwrap_cached(
        &self,
        wrapped: &PhaseGrid,
        cache: &mut EigenvalueCache,
    ) -> SarResult<PhaseGrid> {
        self.validate(wrapped)?;
        let eigenvalues = cache.get(transform_shape(wrapped.dim(), self.params.boundary));
        self.run(wrapped, &eigenvalues)
    }

    /// Unwrap one grid with a precomputed eigenvalue grid.
    ///
    /// `eigenvalues` must have the transform shape of `wrapped` for the
    /// configured boundary condition.
    pub fn unwrap_with_eigenvalues(
        &self,
        wrapped: &PhaseGrid,
        eigenvalues: &LaplacianEigenvalues,
    ) -> SarResult<PhaseGrid> {
        self.validate(wrapped)?;
        self.run(wrapped, eigenvalues)
    }

    /// Five-stage pipeline on an already validated grid
    fn run(&self, wrapped: &PhaseGrid, eigenvalues: &LaplacianEigenvalues) -> SarResult<PhaseGrid> {
        let (rows, cols) = wrapped.dim();
        log::info!(
            "Unwrapping {}x{} phase grid ({} boundary)",
            rows,
            cols,
            self.params.boundary
        );

        let cleaned = fill_gaps(wrapped)?;
        let gradients = wrapped_gradients(&cleaned);
        let rhs = divergence(&gradients);

        let rhs = match self.params.boundary {
            BoundaryCondition::Periodic => rhs,
            BoundaryCondition::Neumann => mirror_extend(&rhs),
        };
        log::debug!("Solving Poisson equation on {:?} grid", rhs.dim());

        let solution = solve_poisson(&rhs, eigenvalues)?;
        log::debug!("Imaginary residual: {:e}", solution.imaginary_residual);

        if !(solution.imaginary_residual <= self.params.imaginary_tolerance) {
            return Err(SarError::NumericalInstability {
                residual: solution.imaginary_residual,
                tolerance: self.params.imaginary_tolerance,
            });
        }

        let unwrapped = match self.params.boundary {
            BoundaryCondition::Periodic => solution.field,
            BoundaryCondition::Neumann => crop(&solution.field, rows, cols),
        };

        log::info!("Phase unwrapping completed successfully");
        Ok(unwrapped)
    }

    fn validate(&self, wrapped: &PhaseGrid) -> SarResult<()> {
        let (rows, cols) = wrapped.dim();
        if rows == 0 || cols == 0 {
            return Err(SarError::InvalidInput(format!(
                "Phase grid {}x{} is empty",
                rows, cols
            )));
        }
        if !(self.params.imaginary_tolerance >= 0.0) {
            return Err(SarError::InvalidInput(format!(
                "Imaginary tolerance must be non-negative, got {}",
                self.params.imaginary_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for PhaseUnwrapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwrap a wrapped phase grid with default parameters
pub fn unwrap_phase_fft(wrapped: &PhaseGrid) -> SarResult<PhaseGrid> {
    PhaseUnwrapper::new().unwrap(wrapped)
}
