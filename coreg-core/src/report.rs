use crate::{Degree, ResidualStats, WarpModel};
use std::fmt;

/// One surviving correspondence as recorded in an [`IterationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPoint {
    pub master_x: f64,
    pub master_y: f64,
    pub slave_x: f64,
    pub slave_y: f64,
    pub row_residual: f64,
    pub col_residual: f64,
    pub rms: f64,
}

/// Structured record of one refinement pass.
///
/// The refinement loop emits one of these per iteration. The structured data
/// is the primary interface; the `Display` implementation renders the same
/// content as the fixed-width residual table traditionally written to the
/// residuals file, and is purely a presentation convenience.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// 0-based refinement pass index.
    pub iteration: usize,
    /// False only for the very first pass of a run; continuation passes are
    /// appended to the same report stream.
    pub append: bool,
    /// Elimination threshold applied before this pass (0 on the first pass,
    /// where nothing is eliminated).
    pub threshold: f32,
    pub degree: Degree,
    /// Coefficient vectors (x, y) when the fit succeeded.
    pub coefficients: Option<(Vec<f64>, Vec<f64>)>,
    /// Surviving correspondences with their residuals. Residual fields are
    /// zero when the fit had insufficient data.
    pub points: Vec<ReportPoint>,
    pub rms: ResidualStats,
    pub row: ResidualStats,
    pub col: ResidualStats,
    pub insufficient_data: bool,
}

impl IterationReport {
    /// Snapshots the model state after one refinement pass.
    pub fn from_model(model: &WarpModel, iteration: usize, append: bool, threshold: f32) -> Self {
        // Residuals from an earlier fit are meaningless once the model went
        // insufficient; report them as zero rather than misaligned values.
        let residual = |v: &[f64], i: usize| {
            if model.insufficient_data {
                0.0
            } else {
                v.get(i).copied().unwrap_or(0.0)
            }
        };
        let points = model
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| ReportPoint {
                master_x: m.master().x(),
                master_y: m.master().y(),
                slave_x: m.slave().x(),
                slave_y: m.slave().y(),
                row_residual: residual(&model.row_residuals, i),
                col_residual: residual(&model.col_residuals, i),
                rms: residual(&model.residuals, i),
            })
            .collect();
        Self {
            iteration,
            append,
            threshold,
            degree: model.degree,
            coefficients: (!model.insufficient_data)
                .then(|| (model.x_coef.clone(), model.y_coef.clone())),
            points,
            rms: model.rms,
            row: model.row,
            col: model.col,
            insufficient_data: model.insufficient_data,
        }
    }

    pub fn surviving(&self) -> usize {
        self.points.len()
    }
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.append {
            writeln!(f, "Transformation degree = {}", self.degree.order())?;
            writeln!(f)?;
        }

        if let Some((x_coef, y_coef)) = &self.coefficients {
            writeln!(f, "WARP coefficients:")?;
            for c in x_coef {
                write!(f, "{c}, ")?;
            }
            writeln!(f)?;
            for c in y_coef {
                write!(f, "{c}, ")?;
            }
            writeln!(f)?;
            writeln!(f)?;
        }

        if self.append {
            writeln!(f, "RMS Threshold: {:5.3}", self.threshold)?;
            writeln!(f)?;
            writeln!(f, "Valid GCPs after pass {}:", self.iteration)?;
        } else {
            writeln!(f, "Initial Valid GCPs:")?;
        }
        writeln!(f)?;

        if !self.insufficient_data {
            writeln!(
                f,
                "  No.  | Master GCP x | Master GCP y | Slave GCP x  | Slave GCP y  \
                 | Row Residual | Col Residual |        RMS        |"
            )?;
            writeln!(f, "{}", "-".repeat(118))?;
            for (i, p) in self.points.iter().enumerate() {
                writeln!(
                    f,
                    "{:6} |{:13.3} |{:13.3} |{:13.3} |{:13.3} |{:13.8} |{:13.8} |{:18.12} |",
                    i, p.master_x, p.master_y, p.slave_x, p.slave_y,
                    p.row_residual, p.col_residual, p.rms,
                )?;
            }
            writeln!(f)?;
            writeln!(f, "Row residual mean = {}", self.row.mean)?;
            writeln!(f, "Row residual std = {}", self.row.std)?;
            writeln!(f, "Col residual mean = {}", self.col.mean)?;
            writeln!(f, "Col residual std = {}", self.col.std)?;
            writeln!(f, "RMS mean = {}", self.rms.mean)?;
            writeln!(f, "RMS std = {}", self.rms.std)?;
        } else {
            writeln!(f, "No. | Master GCP x | Master GCP y | Slave GCP x | Slave GCP y |")?;
            writeln!(f, "{}", "-".repeat(63))?;
            for (i, p) in self.points.iter().enumerate() {
                writeln!(
                    f,
                    "{:2}  |{:13.3} |{:13.3} |{:12.3} |{:12.3} |",
                    i, p.master_x, p.master_y, p.slave_x, p.slave_y,
                )?;
            }
        }
        Ok(())
    }
}
