use crate::Error;

/// Degree of the 2-D warp polynomial.
///
/// The monomial basis is ordered [1, x, y, x², xy, y², x³, x²y, xy², y³],
/// truncated to the degree. Degrees outside 1–3 are rejected at
/// configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degree {
    Linear,
    Quadratic,
    Cubic,
}

impl Degree {
    /// Number of polynomial coefficients per axis: 3, 6, or 10.
    pub fn coefficient_count(self) -> usize {
        let d = self.order();
        (d + 1) * (d + 2) / 2
    }

    /// Minimum number of correspondences required for a fit. Equal to the
    /// coefficient count; with exactly this many points the fit is exact
    /// interpolation, with more it is an overdetermined least-squares solve.
    pub fn required_points(self) -> usize {
        self.coefficient_count()
    }

    pub fn order(self) -> usize {
        match self {
            Degree::Linear => 1,
            Degree::Quadratic => 2,
            Degree::Cubic => 3,
        }
    }

    /// Evaluates the monomial basis at (x, y) into `terms`, which must have
    /// length [`Degree::coefficient_count`].
    pub fn basis(self, x: f64, y: f64, terms: &mut [f64]) {
        debug_assert_eq!(terms.len(), self.coefficient_count());
        terms[0] = 1.0;
        terms[1] = x;
        terms[2] = y;
        if self.order() >= 2 {
            terms[3] = x * x;
            terms[4] = x * y;
            terms[5] = y * y;
        }
        if self.order() >= 3 {
            terms[6] = x * x * x;
            terms[7] = x * x * y;
            terms[8] = x * y * y;
            terms[9] = y * y * y;
        }
    }
}

impl TryFrom<u8> for Degree {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(Degree::Linear),
            2 => Ok(Degree::Quadratic),
            3 => Ok(Degree::Cubic),
            other => Err(Error::UnsupportedDegree(other)),
        }
    }
}
