//! Threshold evaluator: vote-share minimums a candidacy must clear to be
//! eligible for seats. Two independent predicates; which of them apply (one,
//! the other, or both) is strategy policy, not decided here.
//!
//! Comparison is closed-interval (`exactly-at-threshold passes`) and exact:
//! `votes * 100 >= pct * expressed` in u128.

use ap_core::rounding::ge_percent;

/// National threshold: `candidacy_votes / national_expressed >= pct%`.
#[inline]
pub fn passes_national_threshold(candidacy_votes: u64, national_expressed: u64, pct: u8) -> bool {
    ge_percent(candidacy_votes, national_expressed, pct)
}

/// Constituency threshold: same rule, scoped to one constituency.
#[inline]
pub fn passes_constituency_threshold(
    candidacy_votes: u64,
    constituency_expressed: u64,
    pct: u8,
) -> bool {
    ge_percent(candidacy_votes, constituency_expressed, pct)
}
