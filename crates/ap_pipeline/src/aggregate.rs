//! Election-wide aggregation over the per-constituency allocations.

use std::collections::BTreeMap;

use ap_algo::ElectionAllocation;
use ap_core::tokens::CandidacyId;

/// Election-wide seat totals per candidacy plus the grand total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeatTotals {
    pub by_candidacy: BTreeMap<CandidacyId, u32>,
    pub total: u32,
}

pub fn seat_totals(allocation: &ElectionAllocation) -> SeatTotals {
    let mut totals = SeatTotals::default();
    for cons in allocation.values() {
        for (id, a) in &cons.by_candidacy {
            if a.seats > 0 {
                *totals.by_candidacy.entry(id.clone()).or_insert(0) += a.seats;
            }
        }
        totals.total += cons.seats;
    }
    totals
}
