use crate::types::{PhaseGrid, SarError, SarResult, SensorGeometry};
use std::f64::consts::PI;

/// Sentinel-1 C-band radar wavelength in meters
pub const SENTINEL1_WAVELENGTH_M: f64 = 0.055_465_763;

impl SensorGeometry {
    /// Sentinel-1 geometry at the given incidence angle (degrees)
    pub fn sentinel1(incidence_angle_deg: f64) -> Self {
        Self {
            wavelength_m: SENTINEL1_WAVELENGTH_M,
            incidence_angle_deg,
        }
    }

    /// Meters of line-of-sight motion per radian of repeat-pass phase
    pub fn meters_per_radian(&self) -> SarResult<f64> {
        validate_wavelength(self.wavelength_m)?;
        Ok(self.wavelength_m / (4.0 * PI))
    }
}

fn validate_wavelength(wavelength_m: f64) -> SarResult<()> {
    if !(wavelength_m.is_finite() && wavelength_m > 0.0) {
        return Err(SarError::InvalidInput(format!(
            "Wavelength must be positive, got {}",
            wavelength_m
        )));
    }
    Ok(())
}

/// Line-of-sight displacement: `phase * wavelength / 4π`. NaN pixels stay NaN.
pub fn los_displacement(unwrapped: &PhaseGrid, wavelength_m: f64) -> SarResult<PhaseGrid> {
    validate_wavelength(wavelength_m)?;
    let factor = wavelength_m / (4.0 * PI);
    Ok(unwrapped.mapv(|phase| phase * factor))
}

/// Project line-of-sight displacement onto the vertical: `los / cos(incidence)`
pub fn vertical_displacement(los: &PhaseGrid, incidence_angle_deg: f64) -> SarResult<PhaseGrid> {
    if !(0.0..90.0).contains(&incidence_angle_deg) {
        return Err(SarError::InvalidInput(format!(
            "Incidence angle must be in [0, 90) degrees, got {}",
            incidence_angle_deg
        )));
    }
    let cos_inc = incidence_angle_deg.to_radians().cos();
    log::debug!("Projecting LOS to vertical, cos(incidence) = {:.6}", cos_inc);
    Ok(los.mapv(|d| d / cos_inc))
}

/// Phase to vertical displacement in one step
pub fn phase_to_vertical(unwrapped: &PhaseGrid, geometry: &SensorGeometry) -> SarResult<PhaseGrid> {
    let los = los_displacement(unwrapped, geometry.wavelength_m)?;
    vertical_displacement(&los, geometry.incidence_angle_deg)
}
