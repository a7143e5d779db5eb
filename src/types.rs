use chrono::{DateTime, Utc};
use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex spectral coefficient used by the Poisson solver
pub type SpectralComplex = Complex<f64>;

/// 2D wrapped phase in radians (rows x columns), NaN marks no-data
pub type PhaseGrid = Array2<f64>;

/// 2D complex spectrum of a phase-derived field
pub type SpectralGrid = Array2<SpectralComplex>;

/// Boolean validity mask, `true` where the input pixel was NaN
pub type GapMask = Array2<bool>;

/// Boundary treatment of the spectral Poisson solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Reflective edges: the right-hand side is mirror-extended before the
    /// transform, which matches the one-sided divergence at the image border
    Neumann,
    /// Wraparound edges: the right-hand side is transformed as-is
    Periodic,
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        BoundaryCondition::Neumann
    }
}

impl std::fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryCondition::Neumann => write!(f, "Neumann"),
            BoundaryCondition::Periodic => write!(f, "Periodic"),
        }
    }
}

/// Wrapped phase gradients with the undefined trailing column/row set to zero
#[derive(Debug, Clone)]
pub struct GradientField {
    /// Horizontal differences, last column is zero
    pub dx: Array2<f64>,
    /// Vertical differences, last row is zero
    pub dy: Array2<f64>,
}

impl GradientField {
    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }
}

/// Radar sensor geometry needed to turn phase into displacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorGeometry {
    pub wavelength_m: f64,          // meters
    pub incidence_angle_deg: f64,   // degrees from vertical
}

/// Single acquisition of a (topographically flattened) phase screen
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub time: DateTime<Utc>,
    pub phase: PhaseGrid,
}

/// Wrapped interferometric phase between two acquisitions
#[derive(Debug, Clone)]
pub struct Interferogram {
    pub reference_time: DateTime<Utc>,
    pub secondary_time: DateTime<Utc>,
    pub wrapped: PhaseGrid,
}

/// Unwrapped result for one interferometric pair
#[derive(Debug, Clone)]
pub struct PairDisplacement {
    pub reference_time: DateTime<Utc>,
    pub secondary_time: DateTime<Utc>,
    /// Unwrapped phase in radians, NaN where the interferogram was NaN
    pub unwrapped: PhaseGrid,
    /// Line-of-sight displacement in meters, NaN where the interferogram was NaN
    pub los_displacement: PhaseGrid,
}

/// Error types for phase processing
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numerical instability: imaginary residual {residual:e} exceeds tolerance {tolerance:e}")]
    NumericalInstability { residual: f64, tolerance: f64 },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<ndarray::ShapeError> for SarError {
    fn from(e: ndarray::ShapeError) -> Self {
        SarError::Processing(format!("Shape error: {}", e))
    }
}

/// Result type for phase operations
pub type SarResult<T> = Result<T, SarError>;
