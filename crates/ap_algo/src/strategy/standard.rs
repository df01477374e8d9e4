//! Standard strategy: largest-remainder apportionment on the exact Hare
//! quotient Q = V/m.
//!
//! Contract:
//! - Eligibility: a candidacy must pass **every configured** threshold
//!   (national and/or constituency); failing either yields 0 seats and
//!   `eligible = false`, regardless of raw vote share.
//! - Floors are `floor(v/Q) = v*m/V`; remainder keys are `v*m mod V`
//!   (exact remainder × m; same denominator within a constituency).
//! - Shortfall seats go to the largest remainders, strictly descending
//!   (tie keys: remainder ↓, raw votes ↓, then CandidacyId ↑).
//! - With an exact Hare quotient and Σv ≤ V the floors never over-allocate,
//!   so there is no trim path here.
//!
//! Determinism: no RNG anywhere; the tie rule above is a total order.

use std::collections::BTreeMap;

use ap_core::entities::{Constituency, ConstituencyTally, Election, ElectionKind, NationalTally};
use ap_core::tokens::CandidacyId;
use ap_core::variables::Params;

use crate::quotient::{electoral_quotient, floor_seats, remainder_key, QuotientError};
use crate::strategy::{check_vote_data, CalculationStrategy, StrategyError, StrategyMetadata};
use crate::threshold::{passes_constituency_threshold, passes_national_threshold};
use crate::CandidacyAllocation;

pub struct StandardStrategy;

impl CalculationStrategy for StandardStrategy {
    fn name(&self) -> &'static str { "standard" }

    fn version(&self) -> &'static str { "1.0.0" }

    fn metadata(&self) -> StrategyMetadata {
        StrategyMetadata {
            name: self.name(),
            version: self.version(),
            quotient_rule: "exact Hare quotient V/m (rational)",
            threshold_rule: "every configured threshold must pass (national and constituency)",
            tie_break_rule: "remainder desc, raw votes desc, candidacy id asc",
        }
    }

    fn can_apply(&self, election: &Election, _params: &Params) -> Result<(), StrategyError> {
        match election.kind {
            ElectionKind::LegislativeProportional => Ok(()),
            ElectionKind::PresidentialSingleSeat => Err(StrategyError::Incompatible {
                strategy: self.name(),
                reason: "only multi-seat proportional elections are supported".into(),
            }),
        }
    }

    fn calculate_seats(
        &self,
        constituency: &Constituency,
        tally: &ConstituencyTally,
        national: &NationalTally,
        params: &Params,
    ) -> Result<BTreeMap<CandidacyId, CandidacyAllocation>, StrategyError> {
        check_vote_data(constituency, tally)?;

        let seats = constituency.seats;
        let expressed = tally.expressed;
        // Entities enforce seats >= 1; keep the §4.1 contract anyway.
        electoral_quotient(expressed, seats).map_err(|e| match e {
            QuotientError::DivisionByZero => StrategyError::DivisionByZero {
                constituency: constituency.constituency_id.clone(),
            },
        })?;

        let mut out: BTreeMap<CandidacyId, CandidacyAllocation> = BTreeMap::new();
        let mut eligible: Vec<(CandidacyId, u64)> = Vec::new();

        for cand in &constituency.candidacies {
            let id = cand.candidacy_id.clone();
            let votes = tally.votes.get(&id).copied().unwrap_or(0);
            if is_eligible(&id, votes, tally, national, params) {
                eligible.push((id, votes));
            } else {
                out.insert(id, CandidacyAllocation { seats: 0, remainder: 0, eligible: false });
            }
        }

        if eligible.is_empty() {
            return Err(StrategyError::NoEligibleCandidacies {
                constituency: constituency.constituency_id.clone(),
            });
        }

        // Floors + remainder keys (exact integer space).
        let mut sum_floors: u128 = 0;
        let mut ranking: Vec<(CandidacyId, u128, u64)> = Vec::with_capacity(eligible.len());
        for (id, votes) in &eligible {
            let f = floor_seats(*votes, expressed, seats);
            let r = remainder_key(*votes, expressed, seats);
            sum_floors += f as u128;
            out.insert(id.clone(), CandidacyAllocation { seats: f, remainder: r, eligible: true });
            ranking.push((id.clone(), r, *votes));
        }
        debug_assert!(sum_floors <= seats as u128);

        // Largest-remainder distribution of the shortfall.
        ranking.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut shortfall = (seats as u128 - sum_floors) as u32;
        let mut idx = 0usize;
        while shortfall > 0 {
            let id = &ranking[idx].0;
            if let Some(a) = out.get_mut(id) {
                a.seats += 1;
            }
            shortfall -= 1;
            idx += 1;
            if idx == ranking.len() {
                idx = 0; // cycle only in degenerate cases (e.g., zero expressed)
            }
        }

        debug_assert_eq!(out.values().map(|a| a.seats as u128).sum::<u128>(), seats as u128);
        Ok(out)
    }
}

/// Standard composition: each threshold applies iff configured; both must
/// pass when both are configured.
fn is_eligible(
    id: &CandidacyId,
    constituency_votes: u64,
    tally: &ConstituencyTally,
    national: &NationalTally,
    params: &Params,
) -> bool {
    if let Some(pct) = params.national_threshold_pct() {
        if !passes_national_threshold(national.votes_for(id), national.expressed_total, pct) {
            return false;
        }
    }
    if let Some(pct) = params.constituency_threshold_pct() {
        if !passes_constituency_threshold(constituency_votes, tally.expressed, pct) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::entities::{Candidacy, Gender, Nominee};
    use ap_core::tokens::ConstituencyId;
    use core::str::FromStr;

    fn cid(s: &str) -> CandidacyId { CandidacyId::from_str(s).unwrap() }

    fn list(id: &str, n: usize) -> Candidacy {
        let nominees = (0..n as u32)
            .map(|p| Nominee { position: p, name: format!("{id}-{p}"), gender: Gender::Male })
            .collect();
        Candidacy::new(cid(id), format!("List {id}"), nominees).unwrap()
    }

    fn constituency(seats: u32, lists: &[&str]) -> Constituency {
        Constituency::new(
            ConstituencyId::from_str("CIR:001").unwrap(),
            "First".into(),
            seats,
            lists.iter().map(|id| list(id, seats as usize + 1)).collect(),
        )
        .unwrap()
    }

    fn tally_of(c: &Constituency, expressed: u64, votes: &[(&str, u64)]) -> ConstituencyTally {
        ConstituencyTally {
            constituency_id: c.constituency_id.clone(),
            expressed,
            votes: votes.iter().map(|(id, v)| (cid(id), *v)).collect(),
        }
    }

    fn national_of(t: &ConstituencyTally) -> NationalTally {
        NationalTally {
            expressed_total: t.expressed,
            votes: t.votes.clone(),
        }
    }

    #[test]
    fn hare_largest_remainder_worked_example() {
        // 5 seats, V=10000: A=4500, B=3500, C=2000; no thresholds.
        let c = constituency(5, &["CAND:a", "CAND:b", "CAND:c"]);
        let t = tally_of(&c, 10_000, &[("CAND:a", 4500), ("CAND:b", 3500), ("CAND:c", 2000)]);
        let out = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &Params::default())
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats, 2);
        assert_eq!(out[&cid("CAND:b")].seats, 2); // largest remainder takes the leftover
        assert_eq!(out[&cid("CAND:c")].seats, 1);
        assert!(out.values().all(|a| a.eligible));
        assert_eq!(out.values().map(|a| a.seats).sum::<u32>(), 5);
    }

    #[test]
    fn constituency_threshold_excludes_and_redistributes() {
        let c = constituency(5, &["CAND:a", "CAND:b", "CAND:c"]);
        let t = tally_of(&c, 10_000, &[("CAND:a", 4500), ("CAND:b", 3500), ("CAND:c", 2000)]);
        let params = Params {
            constituency_threshold_pct: Some(25), // C at 20% fails
            ..Params::default()
        };
        let out = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &params)
            .unwrap();
        assert!(!out[&cid("CAND:c")].eligible);
        assert_eq!(out[&cid("CAND:c")].seats, 0);
        // Q stays 2000: floors A=2, B=1; leftovers by remainder B (7500) then A (2500).
        assert_eq!(out[&cid("CAND:a")].seats, 3);
        assert_eq!(out[&cid("CAND:b")].seats, 2);
        assert_eq!(out.values().map(|a| a.seats).sum::<u32>(), 5);
    }

    #[test]
    fn equal_remainders_break_by_votes_then_id() {
        // V=9, m=2 → Q=4.5; votes 6 and 3 → floors 1,0; keys 6*2%9=3, 3*2%9=6.
        let c = constituency(2, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 9, &[("CAND:a", 6), ("CAND:b", 3)]);
        let out = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &Params::default())
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats, 1);
        assert_eq!(out[&cid("CAND:b")].seats, 1);

        // Exact remainder tie: V=8, m=2, votes 5 and 3 → keys 2 and 6. Use a
        // symmetric case instead: votes 4 and 4 → keys 0 and 0, floors 1 and 1,
        // nothing left over. Tie on the last seat: V=6, m=1, votes 3 and 3 →
        // floors 0,0, keys 3,3 → raw votes tie → id asc wins.
        let c = constituency(1, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 6, &[("CAND:a", 3), ("CAND:b", 3)]);
        let out = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &Params::default())
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats, 1);
        assert_eq!(out[&cid("CAND:b")].seats, 0);
    }

    #[test]
    fn missing_vote_count_is_malformed() {
        let c = constituency(3, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 100, &[("CAND:a", 60)]); // no count for b
        let err = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &Params::default())
            .unwrap_err();
        assert!(matches!(err, StrategyError::MalformedVoteData { .. }));
    }

    #[test]
    fn vote_sum_above_expressed_is_malformed() {
        let c = constituency(3, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 100, &[("CAND:a", 80), ("CAND:b", 30)]);
        let err = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &Params::default())
            .unwrap_err();
        assert!(matches!(err, StrategyError::MalformedVoteData { .. }));
    }

    #[test]
    fn all_excluded_is_fatal() {
        let c = constituency(3, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 10_000, &[("CAND:a", 100), ("CAND:b", 50)]);
        let params = Params { constituency_threshold_pct: Some(10), ..Params::default() };
        let err = StandardStrategy
            .calculate_seats(&c, &t, &national_of(&t), &params)
            .unwrap_err();
        assert!(matches!(err, StrategyError::NoEligibleCandidacies { .. }));
    }

    #[test]
    fn presidential_election_is_incompatible() {
        let c = constituency(1, &["CAND:a"]);
        let e = Election::new(
            ap_core::tokens::ElectionId::from_str("EL:2027").unwrap(),
            "Presidential".into(),
            ElectionKind::PresidentialSingleSeat,
            vec![c],
        )
        .unwrap();
        let err = StandardStrategy.can_apply(&e, &Params::default()).unwrap_err();
        assert!(matches!(err, StrategyError::Incompatible { .. }));
    }

    #[test]
    fn identical_inputs_identical_output() {
        let c = constituency(7, &["CAND:a", "CAND:b", "CAND:c", "CAND:d"]);
        let t = tally_of(
            &c,
            99_991,
            &[("CAND:a", 31_337), ("CAND:b", 27_182), ("CAND:c", 16_180), ("CAND:d", 14_142)],
        );
        let n = national_of(&t);
        let p = Params::default();
        let a = StandardStrategy.calculate_seats(&c, &t, &n, &p).unwrap();
        let b = StandardStrategy.calculate_seats(&c, &t, &n, &p).unwrap();
        assert_eq!(a, b);
    }
}
