//! Official strategy: the electoral commission's published arithmetic.
//!
//! Same public contract as `standard`, different rules:
//! - Quotient: integer-floored quota `q = floor(V/m)` (the commission's
//!   tables are computed on whole-vote quotas, not exact rationals).
//! - Floors are `v / q` (integer div), remainders are `v mod q`; when
//!   `q == 0` (tiny totals) floors are 0 and remainders are the raw votes.
//! - Thresholds: the national threshold is mandatory (`can_apply` rejects a
//!   configuration without one); the constituency threshold additionally
//!   applies when configured.
//! - Integer quotas can over-allocate; excess seats are trimmed from the
//!   smallest remainders (remainder ↑, raw votes ↑, CandidacyId ↑).
//! - Leftover tie keys: raw votes ↓ first, then remainder ↓, then id ↑.

use std::collections::BTreeMap;

use ap_core::entities::{Constituency, ConstituencyTally, Election, ElectionKind, NationalTally};
use ap_core::tokens::CandidacyId;
use ap_core::variables::Params;

use crate::strategy::{check_vote_data, CalculationStrategy, StrategyError, StrategyMetadata};
use crate::threshold::{passes_constituency_threshold, passes_national_threshold};
use crate::CandidacyAllocation;

pub struct OfficialStrategy;

impl CalculationStrategy for OfficialStrategy {
    fn name(&self) -> &'static str { "official" }

    fn version(&self) -> &'static str { "1.0.0" }

    fn metadata(&self) -> StrategyMetadata {
        StrategyMetadata {
            name: self.name(),
            version: self.version(),
            quotient_rule: "integer quota floor(V/m)",
            threshold_rule: "national threshold mandatory; constituency threshold when configured",
            tie_break_rule: "raw votes desc, remainder desc, candidacy id asc",
        }
    }

    fn can_apply(&self, election: &Election, params: &Params) -> Result<(), StrategyError> {
        if election.kind != ElectionKind::LegislativeProportional {
            return Err(StrategyError::Incompatible {
                strategy: self.name(),
                reason: "only multi-seat proportional elections are supported".into(),
            });
        }
        if params.national_threshold_pct().is_none() {
            return Err(StrategyError::Incompatible {
                strategy: self.name(),
                reason: "a national threshold is required by the official rule".into(),
            });
        }
        Ok(())
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
        if seats == 0 {
            return Err(StrategyError::DivisionByZero {
                constituency: constituency.constituency_id.clone(),
            });
        }
        let q = (tally.expressed as u128) / (seats as u128);

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

        let mut sum_floors: u128 = 0;
        let mut ranking: Vec<(CandidacyId, u128, u64)> = Vec::with_capacity(eligible.len());
        for (id, votes) in &eligible {
            let v = *votes as u128;
            let (f, r) = if q == 0 { (0u128, v) } else { (v / q, v % q) };
            let f32b = if f > u32::MAX as u128 { u32::MAX } else { f as u32 };
            sum_floors += f32b as u128;
            out.insert(id.clone(), CandidacyAllocation { seats: f32b, remainder: r, eligible: true });
            ranking.push((id.clone(), r, *votes));
        }

        if sum_floors < seats as u128 {
            // Leftovers: raw votes ↓, remainder ↓, id ↑.
            ranking.sort_by(|a, b| {
                b.2.cmp(&a.2)
                    .then_with(|| b.1.cmp(&a.1))
                    .then_with(|| a.0.cmp(&b.0))
            });
            let mut shortfall = (seats as u128 - sum_floors) as u32;
            let mut idx = 0usize;
            while shortfall > 0 {
                if let Some(a) = out.get_mut(&ranking[idx].0) {
                    a.seats += 1;
                }
                shortfall -= 1;
                idx += 1;
                if idx == ranking.len() {
                    idx = 0;
                }
            }
        } else if sum_floors > seats as u128 {
            // Integer-quota edge: trim from the smallest remainders.
            ranking.sort_by(|a, b| {
                a.1.cmp(&b.1)
                    .then_with(|| a.2.cmp(&b.2))
                    .then_with(|| a.0.cmp(&b.0))
            });
            let mut excess = sum_floors - seats as u128;
            let mut idx = 0usize;
            while excess > 0 {
                if let Some(a) = out.get_mut(&ranking[idx].0) {
                    if a.seats > 0 {
                        a.seats -= 1;
                        excess -= 1;
                    }
                }
                idx += 1;
                if idx == ranking.len() {
                    idx = 0;
                }
            }
        }

        debug_assert_eq!(out.values().map(|a| a.seats as u128).sum::<u128>(), seats as u128);
        Ok(out)
    }
}

fn is_eligible(
    id: &CandidacyId,
    constituency_votes: u64,
    tally: &ConstituencyTally,
    national: &NationalTally,
    params: &Params,
) -> bool {
    // can_apply guarantees the national threshold is present.
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
            .map(|p| Nominee { position: p, name: format!("{id}-{p}"), gender: Gender::Female })
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
        NationalTally { expressed_total: t.expressed, votes: t.votes.clone() }
    }

    fn with_national(pct: u8) -> Params {
        Params { national_threshold_pct: Some(pct), ..Params::default() }
    }

    #[test]
    fn requires_national_threshold() {
        let c = constituency(3, &["CAND:a"]);
        let e = Election::new(
            ap_core::tokens::ElectionId::from_str("EL:2027").unwrap(),
            "Legislative".into(),
            ElectionKind::LegislativeProportional,
            vec![c],
        )
        .unwrap();
        assert!(OfficialStrategy.can_apply(&e, &Params::default()).is_err());
        assert!(OfficialStrategy.can_apply(&e, &with_national(5)).is_ok());
    }

    #[test]
    fn integer_quota_and_votes_first_leftover() {
        // V=10000, m=5 → q=2000; floors A=2, B=1, C=1 (sum 4). The official
        // leftover rule ranks by raw votes, so A takes the fifth seat.
        let c = constituency(5, &["CAND:a", "CAND:b", "CAND:c"]);
        let t = tally_of(&c, 10_000, &[("CAND:a", 4500), ("CAND:b", 3500), ("CAND:c", 2000)]);
        let out = OfficialStrategy
            .calculate_seats(&c, &t, &national_of(&t), &with_national(0))
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats, 3);
        assert_eq!(out[&cid("CAND:b")].seats, 1);
        assert_eq!(out[&cid("CAND:c")].seats, 1);
    }

    #[test]
    fn over_allocation_is_trimmed_from_smallest_remainder() {
        // V=10, m=4 → q=2; votes 9,1 → floors 4,0 (sum 4 = m, fine).
        // Force excess: V=5, m=4 → q=1; votes 5 → floor 5 > 4.
        let c = constituency(4, &["CAND:a", "CAND:b"]);
        let t = tally_of(&c, 5, &[("CAND:a", 5), ("CAND:b", 0)]);
        let out = OfficialStrategy
            .calculate_seats(&c, &t, &national_of(&t), &with_national(0))
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats + out[&cid("CAND:b")].seats, 4);
    }

    #[test]
    fn leftover_prefers_raw_votes_over_remainder() {
        // V=100, m=3 → q=33; A=40 (f=1,r=7), B=35 (f=1,r=2), C=25 (f=0,r=25).
        // Shortfall 1. Standard would hand it to C (largest remainder); the
        // official rule hands it to A (highest raw votes).
        let c = constituency(3, &["CAND:a", "CAND:b", "CAND:c"]);
        let t = tally_of(&c, 100, &[("CAND:a", 40), ("CAND:b", 35), ("CAND:c", 25)]);
        let out = OfficialStrategy
            .calculate_seats(&c, &t, &national_of(&t), &with_national(0))
            .unwrap();
        assert_eq!(out[&cid("CAND:a")].seats, 2);
        assert_eq!(out[&cid("CAND:b")].seats, 1);
        assert_eq!(out[&cid("CAND:c")].seats, 0);
    }

    #[test]
    fn national_threshold_excludes() {
        let c = constituency(5, &["CAND:a", "CAND:b", "CAND:c"]);
        let t = tally_of(&c, 10_000, &[("CAND:a", 4500), ("CAND:b", 4700), ("CAND:c", 800)]);
        let out = OfficialStrategy
            .calculate_seats(&c, &t, &national_of(&t), &with_national(10))
            .unwrap();
        assert!(!out[&cid("CAND:c")].eligible);
        assert_eq!(out[&cid("CAND:c")].seats, 0);
        assert_eq!(out.values().map(|a| a.seats).sum::<u32>(), 5);
    }
}
