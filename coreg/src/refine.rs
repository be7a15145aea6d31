//! Iterative robust refinement of a warp fit: fit, measure residuals, drop
//! correspondences above a threshold, refit, until the fit settles at or
//! below the caller's RMS tolerance.

use crate::fit::fit_warp;
use coreg_core::{Error, IterationReport, WarpModel};
use log::*;

/// Terminal state of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineState {
    /// A tightening pass at or below the user RMS threshold completed.
    Converged,
    /// Too few correspondences remain for the requested degree; the model is
    /// flagged and its band should be skipped, not the whole run.
    InsufficientData,
    /// The iteration bound was reached before a tightening pass completed.
    IterationLimit,
}

/// Outcome of [`refine_warp`]: the terminal state plus one report per pass.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub state: RefineState,
    pub reports: Vec<IterationReport>,
}

/// Removes every correspondence whose residual from the previous fit meets
/// the threshold. Residuals are index-aligned with the correspondences, so
/// removal walks both in step.
///
/// Returns `false` on the guarded impossible case where more residuals are
/// recorded than correspondences exist, which the caller must treat as
/// insufficient data.
fn eliminate_above_threshold(model: &mut WarpModel, threshold: f32) -> bool {
    if model.residuals.len() > model.matches.len() {
        model.insufficient_data = true;
        return false;
    }
    let before = model.matches.len();
    let residuals = std::mem::take(&mut model.residuals);
    let mut keep = residuals.iter().map(|&r| (r as f32) < threshold);
    model.matches.retain(|_| keep.next().unwrap_or(true));
    model.residuals = residuals;
    trace!(
        "eliminated {} control points at threshold {}",
        before - model.matches.len(),
        threshold
    );
    true
}

/// Runs the bounded fit/eliminate/refit loop on a model.
///
/// Pass 0 fits directly. Every later pass first computes its elimination
/// threshold: while the previous pass's mean residual still exceeds
/// `rms_threshold` and at least one more pass would remain afterwards, the
/// threshold is mean + std of the previous pass (an adaptive one-sigma cut
/// that only discards the worst outliers early); otherwise it is
/// `rms_threshold` itself, the terminal tightening pass. The loop stops once
/// a tightening pass completes, the model runs out of points, or
/// `max_iterations` passes have run.
///
/// `append` marks whether the first emitted report continues an earlier
/// band's report stream.
pub fn refine_warp(
    model: &mut WarpModel,
    rms_threshold: f32,
    max_iterations: usize,
    append: bool,
) -> Result<Refinement, Error> {
    let mut reports = Vec::new();
    let mut state = RefineState::IterationLimit;

    for iter in 0..max_iterations {
        let mut threshold = 0.0f32;
        let append_pass = if iter == 0 { append } else { true };
        if iter > 0 {
            threshold = if iter < max_iterations - 1 && model.rms.mean > rms_threshold as f64 {
                (model.rms.mean + model.rms.std) as f32
            } else {
                rms_threshold
            };
        }

        if threshold > 0.0 && !eliminate_above_threshold(model, threshold) {
            warn!("residual bookkeeping out of step with control point list");
            state = RefineState::InsufficientData;
            reports.push(IterationReport::from_model(model, iter, append_pass, threshold));
            break;
        }

        fit_warp(model)?;
        if !model.insufficient_data {
            model.update_residuals()?;
            debug!(
                "pass {}: {} control points, rms mean {:.6}, std {:.6}",
                iter,
                model.matches.len(),
                model.rms.mean,
                model.rms.std
            );
        }

        reports.push(IterationReport::from_model(model, iter, append_pass, threshold));

        if model.insufficient_data {
            state = RefineState::InsufficientData;
            break;
        }
        if iter > 0 && threshold <= rms_threshold {
            state = RefineState::Converged;
            break;
        }
    }

    Ok(Refinement { state, reports })
}
