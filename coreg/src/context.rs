//! Per-run registration context: one warp model per band, fitted lazily and
//! exactly once, then frozen for concurrent read.

use crate::refine::{refine_warp, RefineState, Refinement};
use crate::Registrar;
use coreg_core::{Error, GcpMatch, IterationReport, WarpModel};
use log::*;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A band's frozen fit: the converged model plus everything the run reports
/// externally about it.
#[derive(Debug, Clone)]
pub struct FittedBand {
    pub model: WarpModel,
    pub state: RefineState,
    pub reports: Vec<IterationReport>,
}

struct BandSlot {
    matches: Vec<GcpMatch>,
    fitted: OnceLock<Result<FittedBand, Error>>,
}

/// Owns the warp models for all bands of one registration run.
///
/// Bands are registered up front with their correspondences; the refinement
/// loop for a band runs lazily on the first request for its model and exactly
/// once regardless of how many tiles ask concurrently (later callers block on
/// the same `OnceLock` until the first fit finishes). After that the model is
/// immutable, so resampling many tiles of an already-fitted band in parallel
/// needs no synchronization.
///
/// A band with too few control points is not an error for the run: its model
/// is flagged insufficient, resampling skips it, and the condition shows up
/// in [`RegistrationRun::warnings`]. Structural failures (coefficient
/// mismatch, singular fit) propagate to every caller for that band.
pub struct RegistrationRun {
    registrar: Registrar,
    bands: HashMap<String, BandSlot>,
    /// Secondary band name -> representative band name. Complex (I/Q) pairs
    /// register the Q band as an alias of the I band so both share one model.
    aliases: HashMap<String, String>,
}

impl RegistrationRun {
    pub fn new(registrar: Registrar) -> Self {
        Self {
            registrar,
            bands: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Registers a band with its master/slave correspondences.
    pub fn add_band(&mut self, name: impl Into<String>, matches: Vec<GcpMatch>) {
        self.bands.insert(
            name.into(),
            BandSlot {
                matches,
                fitted: OnceLock::new(),
            },
        );
    }

    /// Registers `alias` to resolve to `band`'s model. Used for the
    /// imaginary half of a complex pair, which shares the real band's warp.
    pub fn add_alias(&mut self, alias: impl Into<String>, band: impl Into<String>) {
        self.aliases.insert(alias.into(), band.into());
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// The fitted warp for a band, running the refinement loop on first use.
    ///
    /// Returns `None` for an unknown band name.
    pub fn fitted(&self, band: &str) -> Option<Result<&FittedBand, Error>> {
        let key = self.aliases.get(band).map(String::as_str).unwrap_or(band);
        let slot = self.bands.get(key)?;
        let result = slot.fitted.get_or_init(|| self.fit_band(key, slot));
        Some(result.as_ref().map_err(Error::clone))
    }

    fn fit_band(&self, name: &str, slot: &BandSlot) -> Result<FittedBand, Error> {
        info!(
            "fitting degree-{} warp for band {name:?} from {} control points",
            self.registrar.degree.order(),
            slot.matches.len()
        );
        let mut model = WarpModel::new(self.registrar.degree, slot.matches.clone());
        let Refinement { state, reports } = refine_warp(
            &mut model,
            self.registrar.rms_threshold,
            self.registrar.max_iterations,
            false,
        )?;
        if state == RefineState::InsufficientData {
            warn!("band {name:?} does not have enough valid control points for the warp");
        }
        Ok(FittedBand {
            model,
            state,
            reports,
        })
    }

    /// One warning line per band that could not be fitted, in the shape the
    /// run surfaces to its caller. Only bands whose fit has already executed
    /// are inspected; this is meant to be called once all bands are done.
    pub fn warnings(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .bands
            .iter()
            .filter(|(_, slot)| {
                matches!(
                    slot.fitted.get(),
                    Some(Ok(FittedBand {
                        state: RefineState::InsufficientData,
                        ..
                    }))
                )
            })
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
            .into_iter()
            .map(|name| format!("{name} does not have enough valid GCPs for the warp"))
            .collect()
    }
}
