//! Electoral quotient: total expressed suffrages ÷ seat count, kept exact.
//!
//! Contract:
//! - `electoral_quotient` returns the quotient as a reduced rational; a zero
//!   seat count is `DivisionByZero` (upstream data corruption, fatal).
//! - Floor/remainder are computed in integer space so downstream comparisons
//!   are stable: with Q = V/m, `floor(v/Q) = v*m/V` and the remainder key is
//!   `v*m mod V` (the true remainder scaled by m — same denominator within a
//!   constituency, so ordering is exact). No floats on any decision path.
//! - V == 0 (nothing expressed) yields floor 0 and remainder key 0.

use ap_core::rounding::{new_ratio_checked, Ratio};
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuotientError {
    /// Seat count of zero; the quotient is undefined.
    DivisionByZero,
}

impl fmt::Display for QuotientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotientError::DivisionByZero => f.write_str("division by zero: seat count is 0"),
        }
    }
}

impl std::error::Error for QuotientError {}

/// Exact electoral quotient `expressed / seats`.
pub fn electoral_quotient(expressed: u64, seats: u32) -> Result<Ratio, QuotientError> {
    if seats == 0 {
        return Err(QuotientError::DivisionByZero);
    }
    // den > 0 checked above; construction cannot fail.
    new_ratio_checked(expressed as u128, seats as u128).map_err(|_| QuotientError::DivisionByZero)
}

/// `floor(votes / Q)` with Q = expressed/seats, exact. Saturates to u32::MAX;
/// in practice the seat count bounds this far below.
pub fn floor_seats(votes: u64, expressed: u64, seats: u32) -> u32 {
    if expressed == 0 {
        return 0;
    }
    let f = (votes as u128) * (seats as u128) / (expressed as u128);
    if f > u32::MAX as u128 { u32::MAX } else { f as u32 }
}

/// Remainder tie-break key: `votes*seats mod expressed` (remainder × seats).
pub fn remainder_key(votes: u64, expressed: u64, seats: u32) -> u128 {
    if expressed == 0 {
        return 0;
    }
    (votes as u128) * (seats as u128) % (expressed as u128)
}
