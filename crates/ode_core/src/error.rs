use thiserror::Error;

/// Precondition violations of `NumericVector` arithmetic.
///
/// The operator impls panic with these messages; the `checked_*` methods
/// return them instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    #[error("vector length mismatch: left has {left} elements, right has {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("division by zero: divisor is within epsilon of zero")]
    DivisionByZero,
    #[error("cannot normalize a vector of zero length")]
    ZeroLength,
}
