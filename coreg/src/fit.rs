//! Least-squares fitting of the warp polynomial to the surviving
//! correspondences of a [`WarpModel`].

use coreg_core::{Error, WarpModel};
use log::*;
use nalgebra::{DMatrix, DVector};

/// Aggregate absolute master/slave coordinate difference below which the
/// mapping is treated as the exact identity instead of being solved for.
/// When source and destination coincide the normal equations are severely
/// ill conditioned and a direct solve returns garbage coefficients.
const IDENTITY_TOLERANCE: f64 = 0.01;

const SVD_EPSILON: f64 = 1e-12;
const SVD_MAX_ITERATIONS: usize = 1000;

/// Fits the warp polynomial of the model's degree to its correspondences.
///
/// Populates `x_coef`/`y_coef` only; residuals are left untouched and must
/// be recomputed by the caller. With fewer correspondences than the degree
/// requires, the model is flagged `insufficient_data` and the coefficient
/// vectors are cleared instead.
pub fn fit_warp(model: &mut WarpModel) -> Result<(), Error> {
    let required = model.degree.required_points();
    let n = model.matches.len();
    if n < required {
        debug!(
            "not enough control points for degree {}: {} remain, {} required",
            model.degree.order(),
            n,
            required
        );
        model.insufficient_data = true;
        model.x_coef.clear();
        model.y_coef.clear();
        return Ok(());
    }

    let coordinate_spread: f64 = model
        .matches
        .iter()
        .map(|m| {
            (m.slave().x() - m.master().x()).abs() + (m.slave().y() - m.master().y()).abs()
        })
        .sum();
    if coordinate_spread < IDENTITY_TOLERANCE {
        trace!("master and slave control points coincide, using identity warp");
        model.set_identity_warp();
        return Ok(());
    }

    let terms = model.degree.coefficient_count();
    let mut design = DMatrix::zeros(n, terms);
    let mut slave_x = DVector::zeros(n);
    let mut slave_y = DVector::zeros(n);
    let mut row = vec![0.0; terms];
    for (i, m) in model.matches.iter().enumerate() {
        model.degree.basis(m.master().x(), m.master().y(), &mut row);
        for (j, &t) in row.iter().enumerate() {
            design[(i, j)] = t;
        }
        slave_x[i] = m.slave().x();
        slave_y[i] = m.slave().y();
    }

    // Overdetermined with n > terms, exact interpolation with n == terms.
    let svd = design
        .try_svd(true, true, SVD_EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(Error::SingularFit)?;
    let x_coef = svd.solve(&slave_x, SVD_EPSILON).map_err(|_| Error::SingularFit)?;
    let y_coef = svd.solve(&slave_y, SVD_EPSILON).map_err(|_| Error::SingularFit)?;
    model.x_coef = x_coef.iter().copied().collect();
    model.y_coef = y_coef.iter().copied().collect();
    Ok(())
}
