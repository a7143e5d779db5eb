use crate::core::displacement::los_displacement;
use crate::core::gap_fill::{apply_nan_mask, nan_mask};
use crate::core::spectral::{transform_shape, EigenvalueCache, LaplacianEigenvalues};
use crate::core::unwrap::{PhaseUnwrapper, UnwrapParams};
use crate::types::{
    Acquisition, Interferogram, PairDisplacement, PhaseGrid, SarError, SarResult,
};
use ndarray::Zip;

/// Wrapped interferometric phase `secondary - reference`.
///
/// Differences are not re-wrapped; the unwrapper wraps gradients itself.
/// NaN in either input gives NaN in the output.
pub fn form_interferogram(reference: &PhaseGrid, secondary: &PhaseGrid) -> SarResult<PhaseGrid> {
    if reference.dim() != secondary.dim() {
        return Err(SarError::InvalidInput(format!(
            "Reference shape {:?} does not match secondary shape {:?}",
            reference.dim(),
            secondary.dim()
        )));
    }
    Ok(Zip::from(secondary)
        .and(reference)
        .map_collect(|&s, &r| s - r))
}

/// Interferograms between each pair of time-adjacent acquisitions
pub fn consecutive_pairs(acquisitions: &[Acquisition]) -> SarResult<Vec<Interferogram>> {
    let mut ordered: Vec<&Acquisition> = acquisitions.iter().collect();
    ordered.sort_by_key(|a| a.time);

    ordered
        .windows(2)
        .map(|pair| {
            let (reference, secondary) = (pair[0], pair[1]);
            Ok(Interferogram {
                reference_time: reference.time,
                secondary_time: secondary.time,
                wrapped: form_interferogram(&reference.phase, &secondary.phase)?,
            })
        })
        .collect()
}

/// Unwraps a series of interferograms into line-of-sight displacement
#[derive(Debug, Clone)]
pub struct SeriesProcessor {
    unwrapper: PhaseUnwrapper,
    wavelength_m: f64,
}

impl SeriesProcessor {
    pub fn new(params: UnwrapParams, wavelength_m: f64) -> Self {
        Self {
            unwrapper: PhaseUnwrapper::with_params(params),
            wavelength_m,
        }
    }

    /// Process every interferogram in order on the calling thread
    pub fn process(&self, interferograms: &[Interferogram]) -> SarResult<Vec<PairDisplacement>> {
        log::info!("Processing {} interferograms sequentially", interferograms.len());

        let mut cache = EigenvalueCache::new();
        interferograms
            .iter()
            .map(|ifg| {
                let eigenvalues = cache.get(self.transform_shape(ifg));
                self.process_pair(ifg, &eigenvalues)
            })
            .collect()
    }

    /// Process interferograms with one rayon task per pair.
    ///
    /// Eigenvalue grids are built up front, one per distinct shape, and
    /// shared read-only between tasks. Output order matches input order.
    #[cfg(feature = "parallel")]
    pub fn process_parallel(
        &self,
        interferograms: &[Interferogram],
    ) -> SarResult<Vec<PairDisplacement>> {
        use rayon::prelude::*;
        use std::sync::Arc;

        log::info!(
            "Processing {} interferograms on {} threads",
            interferograms.len(),
            rayon::current_num_threads()
        );

        let mut cache = EigenvalueCache::new();
        let jobs: Vec<(&Interferogram, Arc<LaplacianEigenvalues>)> = interferograms
            .iter()
            .map(|ifg| (ifg, cache.get(self.transform_shape(ifg))))
            .collect();
        log::debug!("Prepared {} eigenvalue grids", cache.len());

        jobs.into_par_iter()
            .map(|(ifg, eigenvalues)| self.process_pair(ifg, &eigenvalues))
            .collect()
    }

    fn transform_shape(&self, ifg: &Interferogram) -> (usize, usize) {
        transform_shape(ifg.wrapped.dim(), self.unwrapper.params().boundary)
    }

    fn process_pair(
        &self,
        ifg: &Interferogram,
        eigenvalues: &LaplacianEigenvalues,
    ) -> SarResult<PairDisplacement> {
        log::debug!(
            "Unwrapping pair {} -> {}",
            ifg.reference_time.format("%Y-%m-%d"),
            ifg.secondary_time.format("%Y-%m-%d")
        );

        let gaps = nan_mask(&ifg.wrapped);
        let unwrapped = self
            .unwrapper
            .unwrap_with_eigenvalues(&ifg.wrapped, eigenvalues)?;
        let unwrapped = apply_nan_mask(&unwrapped, &gaps)?;
        let los_displacement = los_displacement(&unwrapped, self.wavelength_m)?;

        Ok(PairDisplacement {
            reference_time: ifg.reference_time,
            secondary_time: ifg.secondary_time,
            unwrapped,
            los_displacement,
        })
    }
}
