//! Core phase processing modules

pub mod gap_fill;
pub mod gradient;
pub mod divergence;
pub mod spectral;
pub mod unwrap;
pub mod displacement;
pub mod interferogram;

// Re-export main types
pub use gap_fill::{fill_gaps, nan_mask, apply_nan_mask};
pub use gradient::{wrap_phase, wrapped_gradients};
pub use divergence::divergence;
pub use spectral::{LaplacianEigenvalues, EigenvalueCache, SpectralSolution, solve_poisson};
pub use unwrap::{PhaseUnwrapper, UnwrapParams, unwrap_phase_fft};
pub use displacement::{los_displacement, vertical_displacement, phase_to_vertical, SENTINEL1_WAVELENGTH_M};
pub use interferogram::{form_interferogram, consecutive_pairs, SeriesProcessor};
