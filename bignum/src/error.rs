//! Errors reported by [`BigInt`](crate::BigInt) operations.
//!
//! Only conditions a caller can act on are reported. Division by zero and
//! similar contract violations are debug assertions, not errors.

use thiserror::Error;

/// Errors from BigInt arithmetic and conversion.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BigIntError {
    /// The result would need more limbs than a buffer may hold.
    #[error("BigInt capacity overflow: {requested} limbs requested, maximum is {max}")]
    CapacityOverflow { requested: usize, max: usize },

    /// Decimal text with no digits (`""` or `"-"`).
    #[error("BigInt parse error: no digits")]
    Empty,

    /// Decimal text containing something other than an ASCII digit.
    #[error("BigInt parse error: invalid character {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },

    /// NaN or infinite floating-point input.
    #[error("BigInt conversion error: value is not finite")]
    NonFinite,

    /// Square root of a negative value.
    #[error("BigInt square root of a negative value")]
    NegativeRoot,

    /// Logarithm of zero or a negative value.
    #[error("BigInt logarithm of a non-positive value")]
    NonPositiveLog,

    /// `RoundingMode::Unnecessary` was requested for an inexact result.
    #[error("BigInt rounding necessary")]
    RoundingNecessary,
}
