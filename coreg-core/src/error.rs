/// Errors surfaced by the co-registration engine.
///
/// `InsufficientControlPoints` is recoverable: the affected band's model is
/// marked insufficient, resampling for that band writes no pixels, and other
/// bands keep processing. The remaining variants indicate configuration or
/// internal contract violations and abort the affected operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{remaining} control points remain but degree requires {required}")]
    InsufficientControlPoints { remaining: usize, required: usize },
    #[error(
        "warp coefficient vectors do not match the declared degree \
         (expected {expected}, got {got_x} for x and {got_y} for y)"
    )]
    CoefficientMismatch {
        expected: usize,
        got_x: usize,
        got_y: usize,
    },
    #[error("unsupported warp polynomial degree {0}, must be 1, 2 or 3")]
    UnsupportedDegree(u8),
    #[error("unknown interpolation method {0:?}")]
    UnknownInterpolation(String),
    #[error("least-squares system for the warp polynomial failed to decompose")]
    SingularFit,
}
