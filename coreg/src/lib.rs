//! # Coreg
//!
//! GCP-based polynomial co-registration of raster images.
//!
//! Given a sparse set of named control point correspondences between a
//! master and a slave raster, this crate fits a low-degree 2-D warp
//! polynomial mapping master pixel coordinates to slave pixel coordinates,
//! robustly rejects outlier correspondences through an iterative
//! fit/eliminate loop, and resamples the slave raster onto the master grid
//! through the fitted warp with a selectable interpolation kernel.
//!
//! The shared data model (control points, [`WarpModel`], residual reports,
//! errors) lives in [`coreg_core`] and is re-exported here.
//!
//! # Example
//!
//! ```
//! use coreg::{pair_control_points, ControlPoint, Registrar, RegistrationRun};
//!
//! let master: Vec<ControlPoint> = (0..8)
//!     .map(|i| ControlPoint::new(format!("p{i}"), (i % 4) as f64 * 50.0, (i / 4) as f64 * 50.0))
//!     .collect();
//! let slave: Vec<ControlPoint> = master
//!     .iter()
//!     .map(|p| ControlPoint::new(p.name.clone(), p.x() + 2.0, p.y() + 3.0))
//!     .collect();
//!
//! let mut run = RegistrationRun::new(Registrar::default());
//! run.add_band("band_1", pair_control_points(&master, &slave));
//! let fitted = run.fitted("band_1").unwrap().unwrap();
//! assert!(!fitted.model.insufficient_data);
//! ```

mod context;
mod fit;
mod kernel;
mod refine;
mod resample;

pub use coreg_core::{
    pair_control_points, ControlPoint, Degree, Error, GcpMatch, IterationReport, ReportPoint,
    ResidualStats, WarpModel,
};
pub use context::{FittedBand, RegistrationRun};
pub use fit::fit_warp;
pub use kernel::{KernelTable, PRECISION_BITS, SUBSAMPLE_BITS};
pub use refine::{refine_warp, RefineState, Refinement};
pub use resample::{ArraySlave, Border, Resampler, SlaveRaster, TileRect};

use std::str::FromStr;

/// Interpolation kernel family used to reconstruct slave samples at warped
/// sub-pixel positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Nearest,
    Bilinear,
    Bicubic,
    /// Sharper bicubic variant (cubic convolution with alpha = -1).
    Bicubic2,
    /// Triangle kernel, the table-driven twin of [`Interpolation::Bilinear`].
    Linear,
    CubicConvolution4,
    CubicConvolution6,
    TruncatedSinc6,
    TruncatedSinc8,
    TruncatedSinc16,
}

impl Interpolation {
    /// Number of source samples in the kernel support window, per axis.
    pub fn taps(self) -> usize {
        match self {
            Interpolation::Nearest | Interpolation::Bilinear | Interpolation::Linear => 2,
            Interpolation::Bicubic
            | Interpolation::Bicubic2
            | Interpolation::CubicConvolution4 => 4,
            Interpolation::CubicConvolution6 | Interpolation::TruncatedSinc6 => 6,
            Interpolation::TruncatedSinc8 => 8,
            Interpolation::TruncatedSinc16 => 16,
        }
    }

    /// Builds this family's [`KernelTable`].
    pub fn kernel_table(self) -> KernelTable {
        KernelTable::build(self)
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    /// Accepts both the short selector tokens and the traditional display
    /// names of the interpolation methods.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "nearest" | "Nearest-neighbor interpolation" => Ok(Interpolation::Nearest),
            "bilinear" | "Bilinear interpolation" => Ok(Interpolation::Bilinear),
            "bicubic" | "Bicubic interpolation" => Ok(Interpolation::Bicubic),
            "bicubic2" | "Bicubic2 interpolation" => Ok(Interpolation::Bicubic2),
            "linear" | "Linear interpolation" => Ok(Interpolation::Linear),
            "cc4p" | "Cubic convolution (4 points)" => Ok(Interpolation::CubicConvolution4),
            "cc6p" | "Cubic convolution (6 points)" => Ok(Interpolation::CubicConvolution6),
            "ts6p" | "Truncated sinc (6 points)" => Ok(Interpolation::TruncatedSinc6),
            "ts8p" | "Truncated sinc (8 points)" => Ok(Interpolation::TruncatedSinc8),
            "ts16p" | "Truncated sinc (16 points)" => Ok(Interpolation::TruncatedSinc16),
            other => Err(Error::UnknownInterpolation(other.to_string())),
        }
    }
}

/// Configuration of one co-registration run.
///
/// The most important knob is `rms_threshold`: the largest residual (pixels)
/// a correspondence may have and still take part in the final fit. The
/// refinement loop approaches it adaptively, eliminating only gross outliers
/// in early passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registrar {
    /// Degree of the warp polynomial.
    pub degree: Degree,
    /// RMS threshold (pixels) for eliminating control points.
    pub rms_threshold: f32,
    /// Upper bound on fit/eliminate/refit passes per band.
    pub max_iterations: usize,
    /// Interpolation method used when resampling the slave raster.
    pub interpolation: Interpolation,
}

impl Registrar {
    /// A registrar with the given degree and the default thresholds.
    pub fn new(degree: Degree) -> Self {
        Self {
            degree,
            ..Default::default()
        }
    }

    /// Builds the configured [`Resampler`].
    pub fn resampler(&self) -> Resampler {
        Resampler::new(self.interpolation.kernel_table())
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self {
            degree: Degree::Quadratic,
            rms_threshold: 0.5,
            max_iterations: 20,
            interpolation: Interpolation::Bilinear,
        }
    }
}
