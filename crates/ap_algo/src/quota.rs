//! Gender-quota allocator: post-aggregation pass ensuring the election-wide
//! share of seats held by the target gender meets the configured minimum.
//!
//! Seating model: a candidacy holding `s` seats seats its first `s` list
//! positions. A substitution swaps one seated nominee for a later alternate
//! of the target gender **on the same list**, so per-candidacy seat counts
//! and per-constituency totals never change.
//!
//! Fixed substitution order (deterministic and auditable):
//! - constituencies: seat count ↓, then ConstituencyId ↑
//! - candidacies within one: allocated seats ↓, then CandidacyId ↑
//! - outgoing: the highest seated position (lowest list priority) not of the
//!   target gender; incoming: the lowest unseated position of the target
//!   gender on the same list
//! - one substitution per candidacy visit; rounds repeat until the quota is
//!   met or a full round makes no progress.
//!
//! An unmet quota is a warning carried in the outcome, never an error.

use std::collections::BTreeMap;

use ap_core::determinism::{cmp_candidacy_seats_desc_then_id, cmp_seats_desc_then_id};
use ap_core::entities::{Candidacy, Election, Gender};
use ap_core::tokens::{CandidacyId, ConstituencyId};
use ap_core::variables::Params;

use crate::ElectionAllocation;

/// Seated list positions per candidacy per constituency (ascending order).
pub type Seating = BTreeMap<ConstituencyId, BTreeMap<CandidacyId, Vec<u32>>>;

/// One recorded seat substitution (audit trail entry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaSubstitution {
    pub constituency_id: ConstituencyId,
    pub candidacy_id: CandidacyId,
    pub out_position: u32,
    pub out_name: String,
    pub in_position: u32,
    pub in_name: String,
}

/// Non-fatal warning: quota could not be met with the available alternates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaUnmet {
    pub required: u32,
    pub achieved: u32,
}

/// Outcome of the quota pass: final seating, audit trail, optional warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaOutcome {
    pub seating: Seating,
    pub substitutions: Vec<QuotaSubstitution>,
    pub warning: Option<QuotaUnmet>,
}

/// Seat the first `s` positions of every winning list.
pub fn initial_seating(election: &Election, allocation: &ElectionAllocation) -> Seating {
    let mut seating: Seating = BTreeMap::new();
    for (cons_id, cons_alloc) in allocation {
        let mut per_candidacy: BTreeMap<CandidacyId, Vec<u32>> = BTreeMap::new();
        let constituency = election.constituency(cons_id);
        for (cand_id, a) in &cons_alloc.by_candidacy {
            if a.seats == 0 {
                continue;
            }
            let positions = match constituency.and_then(|c| c.candidacy(cand_id)) {
                Some(cand) => cand
                    .nominees
                    .iter()
                    .take(a.seats as usize)
                    .map(|n| n.position)
                    .collect(),
                None => Vec::new(),
            };
            per_candidacy.insert(cand_id.clone(), positions);
        }
        seating.insert(cons_id.clone(), per_candidacy);
    }
    seating
}

/// Run the quota pass over the full aggregate. With no quota configured this
/// returns the initial seating untouched.
pub fn apply_gender_quota(
    election: &Election,
    params: &Params,
    allocation: &ElectionAllocation,
) -> QuotaOutcome {
    let mut seating = initial_seating(election, allocation);

    let pct = match params.gender_quota_pct() {
        Some(p) => p,
        None => {
            return QuotaOutcome { seating, substitutions: Vec::new(), warning: None };
        }
    };
    let target = params.quota_gender();

    let total_seats: u64 = allocation.values().map(|a| a.seats as u64).sum();
    let required = (((total_seats * pct as u64) + 99) / 100) as u32;
    let mut achieved = count_target_seats(election, &seating, target);

    // Fixed visiting order (see module docs).
    let mut cons_order: Vec<(u32, &ConstituencyId)> = allocation
        .values()
        .map(|a| (a.seats, &a.constituency_id))
        .collect();
    cons_order.sort_by(cmp_seats_desc_then_id);

    let mut substitutions: Vec<QuotaSubstitution> = Vec::new();

    while achieved < required {
        let mut progressed = false;

        'round: for (_, cons_id) in &cons_order {
            let constituency = match election.constituency(cons_id) {
                Some(c) => c,
                None => continue,
            };
            let cons_alloc = &allocation[*cons_id];

            let mut cand_order: Vec<(u32, &CandidacyId)> = cons_alloc
                .by_candidacy
                .iter()
                .filter(|(_, a)| a.seats > 0)
                .map(|(id, a)| (a.seats, id))
                .collect();
            cand_order.sort_by(cmp_candidacy_seats_desc_then_id);

            for (_, cand_id) in cand_order {
                let candidacy = match constituency.candidacy(cand_id) {
                    Some(c) => c,
                    None => continue,
                };
                let seated = seating
                    .get_mut(*cons_id)
                    .and_then(|m| m.get_mut(cand_id));
                let seated = match seated {
                    Some(s) => s,
                    None => continue,
                };
                if let Some(sub) = try_substitute(candidacy, seated, target) {
                    substitutions.push(QuotaSubstitution {
                        constituency_id: (*cons_id).clone(),
                        candidacy_id: cand_id.clone(),
                        out_position: sub.0,
                        out_name: sub.1,
                        in_position: sub.2,
                        in_name: sub.3,
                    });
                    achieved += 1;
                    progressed = true;
                    if achieved >= required {
                        break 'round;
                    }
                }
            }
        }

        if !progressed {
            break; // no eligible alternate anywhere; report instead of failing
        }
    }

    let warning = if achieved < required {
        Some(QuotaUnmet { required, achieved })
    } else {
        None
    };

    QuotaOutcome { seating, substitutions, warning }
}

/// Count seated nominees of the target gender across the whole election.
pub fn count_target_seats(election: &Election, seating: &Seating, target: Gender) -> u32 {
    let mut count = 0u32;
    for (cons_id, per_candidacy) in seating {
        let constituency = match election.constituency(cons_id) {
            Some(c) => c,
            None => continue,
        };
        for (cand_id, positions) in per_candidacy {
            let candidacy = match constituency.candidacy(cand_id) {
                Some(c) => c,
                None => continue,
            };
            for &pos in positions {
                if candidacy.nominee_at(pos).map(|n| n.gender) == Some(target) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Swap out the lowest-priority seated non-target nominee for the highest-
/// priority unseated target-gender alternate, if both exist.
/// Returns (out_position, out_name, in_position, in_name).
fn try_substitute(
    candidacy: &Candidacy,
    seated: &mut Vec<u32>,
    target: Gender,
) -> Option<(u32, String, u32, String)> {
    let out_pos = seated
        .iter()
        .rev()
        .copied()
        .find(|&p| candidacy.nominee_at(p).map(|n| n.gender) != Some(target))?;
    let in_nominee = candidacy
        .nominees
        .iter()
        .find(|n| n.gender == target && !seated.contains(&n.position))?;

    let out_name = candidacy.nominee_at(out_pos).map(|n| n.name.clone()).unwrap_or_default();
    let in_pos = in_nominee.position;
    let in_name = in_nominee.name.clone();

    seated.retain(|&p| p != out_pos);
    seated.push(in_pos);
    seated.sort_unstable();

    Some((out_pos, out_name, in_pos, in_name))
}
