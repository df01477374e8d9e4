//! Result-document builder.
//!
//! The document is a typed mirror of the external JSON artifact. Its id is
//! `RES:<sha256>` over the canonical bytes of the document with the id field
//! empty (and therefore skipped), so the id never hashes itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ap_algo::strategy::StrategyMetadata;
use ap_algo::{ElectionAllocation, QuotaOutcome};
use ap_core::entities::Election;
use ap_io::hasher::res_id_from_canonical;
use ap_io::IoResult;

use crate::aggregate::SeatTotals;
use crate::EngineMeta;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDoc {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub engine: EngineMeta,
    pub election_id: String,
    pub strategy: StrategyBlock,
    /// SHA-256 of the raw input bundle bytes.
    pub input_sha256: String,
    pub total_seats: u32,
    pub seats_by_candidacy: BTreeMap<String, u32>,
    pub constituencies: BTreeMap<String, ConstituencyBlock>,
    /// Final seated list positions per candidacy per constituency.
    pub seating: BTreeMap<String, BTreeMap<String, Vec<u32>>>,
    /// Quota audit trail, in application order.
    pub substitutions: Vec<SubstitutionBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_unmet: Option<QuotaUnmetBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyBlock {
    pub name: String,
    pub version: String,
    pub quotient_rule: String,
    pub threshold_rule: String,
    pub tie_break_rule: String,
}

impl From<StrategyMetadata> for StrategyBlock {
    fn from(m: StrategyMetadata) -> Self {
        Self {
            name: m.name.into(),
            version: m.version.into(),
            quotient_rule: m.quotient_rule.into(),
            threshold_rule: m.threshold_rule.into(),
            tie_break_rule: m.tie_break_rule.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstituencyBlock {
    pub seats: u32,
    pub by_candidacy: BTreeMap<String, CandidacySeatsBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidacySeatsBlock {
    pub seats: u32,
    pub eligible: bool,
    /// Strategy tie-break key at floor time, kept as a decimal string (the
    /// key is u128; JSON numbers stop at u64).
    pub remainder_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionBlock {
    pub constituency_id: String,
    pub candidacy_id: String,
    pub out_position: u32,
    pub out_name: String,
    pub in_position: u32,
    pub in_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaUnmetBlock {
    pub required: u32,
    pub achieved: u32,
}

pub fn build(
    engine: &EngineMeta,
    election: &Election,
    strategy: StrategyMetadata,
    input_sha256: &str,
    allocation: &ElectionAllocation,
    totals: &SeatTotals,
    quota: QuotaOutcome,
) -> IoResult<ResultDoc> {
    let constituencies = allocation
        .iter()
        .map(|(cid, cons)| {
            let by_candidacy = cons
                .by_candidacy
                .iter()
                .map(|(id, a)| {
                    (
                        id.to_string(),
                        CandidacySeatsBlock {
                            seats: a.seats,
                            eligible: a.eligible,
                            remainder_key: a.remainder.to_string(),
                        },
                    )
                })
                .collect();
            (cid.to_string(), ConstituencyBlock { seats: cons.seats, by_candidacy })
        })
        .collect();

    let seating = quota
        .seating
        .iter()
        .map(|(cid, per_candidacy)| {
            (
                cid.to_string(),
                per_candidacy
                    .iter()
                    .map(|(id, positions)| (id.to_string(), positions.clone()))
                    .collect(),
            )
        })
        .collect();

    let substitutions = quota
        .substitutions
        .into_iter()
        .map(|s| SubstitutionBlock {
            constituency_id: s.constituency_id.to_string(),
            candidacy_id: s.candidacy_id.to_string(),
            out_position: s.out_position,
            out_name: s.out_name,
            in_position: s.in_position,
            in_name: s.in_name,
        })
        .collect();

    let mut doc = ResultDoc {
        id: String::new(),
        engine: engine.clone(),
        election_id: election.election_id.to_string(),
        strategy: strategy.into(),
        input_sha256: input_sha256.to_string(),
        total_seats: totals.total,
        seats_by_candidacy: totals
            .by_candidacy
            .iter()
            .map(|(id, &s)| (id.to_string(), s))
            .collect(),
        constituencies,
        seating,
        substitutions,
        quota_unmet: quota.warning.map(|w| QuotaUnmetBlock { required: w.required, achieved: w.achieved }),
    };

    let id = res_id_from_canonical(&doc)?;
    doc.id = id.to_string();
    Ok(doc)
}
