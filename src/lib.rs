//! sarphase: least-squares phase unwrapping for repeat-pass InSAR
//!
//! Turns wrapped interferometric phase into a continuous phase field by
//! solving a discrete Poisson equation in the Fourier domain, and converts
//! the result into line-of-sight or vertical displacement.

pub mod types;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    PhaseGrid, GradientField, BoundaryCondition, SensorGeometry, Acquisition,
    Interferogram, PairDisplacement, SarError, SarResult
};

pub use crate::core::{PhaseUnwrapper, UnwrapParams, EigenvalueCache, SeriesProcessor, unwrap_phase_fft};

/// Python module definition
#[cfg(feature = "python")]
mod python {
    use crate::types::SarError;
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
    use pyo3::prelude::*;

    fn to_py_err(e: SarError) -> PyErr {
        match e {
            SarError::InvalidInput(_) => {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
            }
            _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)),
        }
    }

    /// Unwrap a 2D float64 array of wrapped phase (radians, NaN allowed)
    #[pyfunction]
    fn unwrap_phase_fft<'py>(
        py: Python<'py>,
        wrapped: PyReadonlyArray2<'py, f64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let grid = wrapped.as_array().to_owned();
        let unwrapped = py
            .allow_threads(|| crate::core::unwrap_phase_fft(&grid))
            .map_err(to_py_err)?;
        Ok(unwrapped.into_pyarray(py))
    }

    /// Convert unwrapped phase (radians) to line-of-sight displacement (meters)
    #[pyfunction]
    fn los_displacement<'py>(
        py: Python<'py>,
        unwrapped: PyReadonlyArray2<'py, f64>,
        wavelength: f64,
    ) -> PyResult<&'py PyArray2<f64>> {
        let displacement = crate::core::los_displacement(&unwrapped.as_array().to_owned(), wavelength)
            .map_err(to_py_err)?;
        Ok(displacement.into_pyarray(py))
    }

    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(unwrap_phase_fft, m)?)?;
        m.add_function(wrap_pyfunction!(los_displacement, m)?)?;
        Ok(())
    }
}
