//! Discretized interpolation kernel tables.
//!
//! Each supported interpolation family is discretized once into a lookup
//! table of tap weights at a fixed number of sub-pixel phases. The table is
//! immutable and shared read-only by every resampling call for a run, so
//! building it is a pure function of the family name.

use crate::Interpolation;
use std::f64::consts::PI;

/// Sub-pixel phase resolution: 2^7 = 128 phases.
pub const SUBSAMPLE_BITS: u32 = 7;
/// Fractional precision advertised for fixed-point consumers of the table.
pub const PRECISION_BITS: u32 = 32;

/// Precomputed interpolation weights for one kernel family.
///
/// `weights` holds `phases() * taps` entries, row per phase. For an output
/// sample at source position `floor + frac`, the taps cover the integer
/// source samples `floor - padding .. floor - padding + taps`, and tap `j`
/// at phase `p = frac * phases()` weighs sample `floor - padding + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelTable {
    weights: Vec<f64>,
    /// Number of source samples in the support window, per axis.
    pub taps: usize,
    /// Source samples to the left of (and above) the anchor sample.
    pub padding: usize,
    pub subsample_bits: u32,
    pub precision_bits: u32,
}

impl KernelTable {
    /// Builds the table for an interpolation family. Deterministic and
    /// independent of any image content.
    pub fn build(method: Interpolation) -> Self {
        let taps = method.taps();
        let padding = taps / 2 - 1;
        let phases = 1usize << SUBSAMPLE_BITS;
        let mut weights = Vec::with_capacity(phases * taps);
        for p in 0..phases {
            let frac = p as f64 / phases as f64;
            for j in 0..taps {
                // Signed distance from the interpolation position to tap j.
                let x = frac + padding as f64 - j as f64;
                weights.push(kernel_value(method, x));
            }
        }
        Self {
            weights,
            taps,
            padding,
            subsample_bits: SUBSAMPLE_BITS,
            precision_bits: PRECISION_BITS,
        }
    }

    pub fn phases(&self) -> usize {
        1 << self.subsample_bits
    }

    /// Discretizes a fractional offset in [0, 1) to a phase index.
    pub fn phase_of(&self, frac: f64) -> usize {
        ((frac * self.phases() as f64) as usize).min(self.phases() - 1)
    }

    /// Tap weights for one sub-pixel phase.
    pub fn row(&self, phase: usize) -> &[f64] {
        &self.weights[phase * self.taps..(phase + 1) * self.taps]
    }
}

fn kernel_value(method: Interpolation, x: f64) -> f64 {
    match method {
        Interpolation::Nearest => rect(x),
        Interpolation::Bilinear | Interpolation::Linear => tri(x),
        Interpolation::Bicubic => cubic_convolution(x, -0.5),
        Interpolation::Bicubic2 | Interpolation::CubicConvolution4 => cubic_convolution(x, -1.0),
        Interpolation::CubicConvolution6 => cubic_convolution_6p(x, -0.5, 0.5),
        Interpolation::TruncatedSinc6 => truncated_sinc(x, 6.0),
        Interpolation::TruncatedSinc8 => truncated_sinc(x, 8.0),
        Interpolation::TruncatedSinc16 => truncated_sinc(x, 16.0),
    }
}

/// Step function: round to the nearest source sample, halves round up.
fn rect(x: f64) -> f64 {
    if (-0.5..0.5).contains(&x) {
        1.0
    } else {
        0.0
    }
}

/// Triangle (linear interpolation) kernel.
fn tri(x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        1.0 - x
    } else {
        0.0
    }
}

/// 4-point cubic convolution. alpha = -0.5 is the classic Keys kernel
/// (bicubic), alpha = -1.0 its sharper variant.
fn cubic_convolution(x: f64, alpha: f64) -> f64 {
    let x = x.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    if x < 1.0 {
        (alpha + 2.0) * x3 - (alpha + 3.0) * x2 + 1.0
    } else if x < 2.0 {
        alpha * (x3 - 5.0 * x2 + 8.0 * x - 4.0)
    } else {
        0.0
    }
}

/// 6-point cubic convolution with the two-parameter piecewise form.
fn cubic_convolution_6p(x: f64, alpha: f64, beta: f64) -> f64 {
    let x = x.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    if x < 1.0 {
        (alpha - beta + 2.0) * x3 - (alpha - beta + 3.0) * x2 + 1.0
    } else if x < 2.0 {
        alpha * x3 - (5.0 * alpha - beta) * x2 + (8.0 * alpha - 3.0 * beta) * x
            - (4.0 * alpha - 2.0 * beta)
    } else if x < 3.0 {
        beta * x3 - 8.0 * beta * x2 + 21.0 * beta * x - 18.0 * beta
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Sinc truncated to an n-sample support window.
fn truncated_sinc(x: f64, n: f64) -> f64 {
    if x.abs() < n / 2.0 {
        sinc(x)
    } else {
        0.0
    }
}
