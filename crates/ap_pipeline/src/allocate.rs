//! Per-constituency allocation stage.
//!
//! Constituencies are processed in ascending `ConstituencyId` order (the
//! election snapshot keeps them sorted); the first strategy failure aborts
//! the whole run. Each calculation is pure, so the order only matters for
//! which error surfaces first.

use ap_algo::{CalculationStrategy, ConstituencyAllocation, ElectionAllocation, StrategyError};
use ap_core::entities::{Election, ElectionTally, NationalTally};
use ap_core::variables::Params;

/// Allocate every constituency or fail whole.
pub fn allocate_all(
    strategy: &dyn CalculationStrategy,
    election: &Election,
    tally: &ElectionTally,
    national: &NationalTally,
    params: &Params,
) -> Result<ElectionAllocation, StrategyError> {
    let mut allocation = ElectionAllocation::new();
    for constituency in &election.constituencies {
        let cid = &constituency.constituency_id;
        // The loader guarantees a tally per constituency; re-check here so a
        // hand-built context fails the same way.
        let ct = tally.constituencies.get(cid).ok_or_else(|| StrategyError::MalformedVoteData {
            constituency: cid.clone(),
            detail: "no tally for constituency".into(),
        })?;
        let by_candidacy = strategy.calculate_seats(constituency, ct, national, params)?;
        allocation.insert(
            cid.clone(),
            ConstituencyAllocation {
                constituency_id: cid.clone(),
                seats: constituency.seats,
                by_candidacy,
            },
        );
    }
    Ok(allocation)
}
