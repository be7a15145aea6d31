use crate::{Degree, Error, GcpMatch};

/// Mean and population standard deviation of a residual component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResidualStats {
    pub mean: f64,
    pub std: f64,
}

impl ResidualStats {
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mean_sq = values.iter().map(|v| v * v).sum::<f64>() / n;
        Self {
            mean,
            std: (mean_sq - mean * mean).max(0.0).sqrt(),
        }
    }
}

/// Per-band warp state for one registration run.
///
/// Holds the surviving correspondences, the fitted polynomial coefficients
/// for both axes, and the residual vectors and statistics from the latest
/// fit. The refinement loop mutates this in place; once refinement finishes
/// the model is only ever read (warp evaluation, resampling, reporting).
///
/// Invariants kept by the engine: `x_coef` and `y_coef` always have equal
/// length, both empty exactly when `insufficient_data` is set, and the three
/// residual vectors are index-aligned with `matches` after any fit.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpModel {
    pub degree: Degree,
    pub matches: Vec<GcpMatch>,
    pub x_coef: Vec<f64>,
    pub y_coef: Vec<f64>,
    /// Combined residual sqrt(dx² + dy²) per surviving correspondence.
    pub residuals: Vec<f64>,
    /// Column (x) residual component per surviving correspondence.
    pub col_residuals: Vec<f64>,
    /// Row (y) residual component per surviving correspondence.
    pub row_residuals: Vec<f64>,
    pub rms: ResidualStats,
    pub row: ResidualStats,
    pub col: ResidualStats,
    /// Set when fewer correspondences remain than the degree requires. Once
    /// set, no further elimination or refitting happens for this run.
    pub insufficient_data: bool,
}

impl WarpModel {
    pub fn new(degree: Degree, matches: Vec<GcpMatch>) -> Self {
        Self {
            degree,
            matches,
            x_coef: Vec::new(),
            y_coef: Vec::new(),
            residuals: Vec::new(),
            col_residuals: Vec::new(),
            row_residuals: Vec::new(),
            rms: ResidualStats::default(),
            row: ResidualStats::default(),
            col: ResidualStats::default(),
            insufficient_data: false,
        }
    }

    /// Evaluates the fitted warp at a master-coordinate point, returning the
    /// matching slave coordinates.
    ///
    /// Fails with [`Error::InsufficientControlPoints`] on a model whose fit
    /// was starved of data, and with [`Error::CoefficientMismatch`] if the
    /// coefficient vectors disagree with each other or with the declared
    /// degree. The latter is an internal contract violation between fitter
    /// and evaluator, never a data problem, and must not be tolerated
    /// silently.
    pub fn warp(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        if self.insufficient_data {
            return Err(Error::InsufficientControlPoints {
                remaining: self.matches.len(),
                required: self.degree.required_points(),
            });
        }
        let expected = self.degree.coefficient_count();
        if self.x_coef.len() != expected || self.y_coef.len() != expected {
            return Err(Error::CoefficientMismatch {
                expected,
                got_x: self.x_coef.len(),
                got_y: self.y_coef.len(),
            });
        }
        let mut terms = [0.0; 10];
        let terms = &mut terms[..expected];
        self.degree.basis(x, y, terms);
        let sx = terms
            .iter()
            .zip(&self.x_coef)
            .map(|(t, c)| t * c)
            .sum::<f64>();
        let sy = terms
            .iter()
            .zip(&self.y_coef)
            .map(|(t, c)| t * c)
            .sum::<f64>();
        Ok((sx, sy))
    }

    /// Reprojects every surviving correspondence through the current warp and
    /// recomputes the residual vectors and their statistics.
    ///
    /// For correspondence i: dX = warped master x − observed slave x, dY the
    /// same for y, combined residual sqrt(dX² + dY²). Statistics are the mean
    /// and population standard deviation of each vector.
    pub fn update_residuals(&mut self) -> Result<(), Error> {
        let n = self.matches.len();
        self.residuals.clear();
        self.col_residuals.clear();
        self.row_residuals.clear();
        self.residuals.reserve(n);
        self.col_residuals.reserve(n);
        self.row_residuals.reserve(n);
        for m in &self.matches {
            let (sx, sy) = self.warp(m.master().x(), m.master().y())?;
            let dx = sx - m.slave().x();
            let dy = sy - m.slave().y();
            self.col_residuals.push(dx);
            self.row_residuals.push(dy);
            self.residuals.push((dx * dx + dy * dy).sqrt());
        }
        self.rms = ResidualStats::of(&self.residuals);
        self.row = ResidualStats::of(&self.row_residuals);
        self.col = ResidualStats::of(&self.col_residuals);
        Ok(())
    }

    /// Writes the identity polynomial for the declared degree: constant 0,
    /// linear coefficient 1 on the matching axis, every other term 0.
    pub fn set_identity_warp(&mut self) {
        let n = self.degree.coefficient_count();
        self.x_coef = vec![0.0; n];
        self.y_coef = vec![0.0; n];
        self.x_coef[1] = 1.0;
        self.y_coef[2] = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlPoint;
    use approx::assert_relative_eq;

    fn matches_for(points: &[(f64, f64, f64, f64)]) -> Vec<GcpMatch> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(mx, my, sx, sy))| {
                GcpMatch(
                    ControlPoint::new(format!("p{i}"), mx, my),
                    ControlPoint::new(format!("p{i}"), sx, sy),
                )
            })
            .collect()
    }

    #[test]
    fn identity_warp_maps_points_to_themselves() {
        let mut model = WarpModel::new(Degree::Cubic, Vec::new());
        model.set_identity_warp();
        let (sx, sy) = model.warp(12.5, -3.25).unwrap();
        assert_eq!((sx, sy), (12.5, -3.25));
    }

    #[test]
    fn warp_rejects_mismatched_coefficients() {
        let mut model = WarpModel::new(Degree::Quadratic, Vec::new());
        model.x_coef = vec![0.0; 6];
        model.y_coef = vec![0.0; 3];
        assert_eq!(
            model.warp(0.0, 0.0),
            Err(Error::CoefficientMismatch {
                expected: 6,
                got_x: 6,
                got_y: 3,
            })
        );
    }

    #[test]
    fn warp_refuses_a_starved_model() {
        let mut model = WarpModel::new(Degree::Cubic, Vec::new());
        model.insufficient_data = true;
        assert_eq!(
            model.warp(1.0, 1.0),
            Err(Error::InsufficientControlPoints {
                remaining: 0,
                required: 10,
            })
        );
    }

    #[test]
    fn residual_statistics_are_population_statistics() {
        // Identity warp with slave points offset by known amounts.
        let mut model = WarpModel::new(
            Degree::Linear,
            matches_for(&[(0.0, 0.0, 1.0, 0.0), (5.0, 5.0, 8.0, 5.0)]),
        );
        model.set_identity_warp();
        model.update_residuals().unwrap();
        // Residuals are 1 and 3; population mean 2, std 1.
        assert_relative_eq!(model.rms.mean, 2.0, epsilon = 1e-12);
        assert_relative_eq!(model.rms.std, 1.0, epsilon = 1e-12);
        assert_relative_eq!(model.col_residuals[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(model.col.mean, -2.0, epsilon = 1e-12);
        assert_relative_eq!(model.row.mean, 0.0, epsilon = 1e-12);
    }
}
