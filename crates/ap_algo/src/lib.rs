// crates/ap_algo/src/lib.rs
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

// Core tokens and entities
pub use ap_core::{
    entities::{Constituency, ConstituencyTally, Election, NationalTally},
    tokens::{CandidacyId, ConstituencyId},
};

// ----------------------------- Canonical per-constituency output -----------------------------

/// Per-candidacy outcome within one constituency. `remainder` is the
/// strategy's tie-break key at floor time (scale is strategy-defined and
/// documented in its metadata); ineligible candidacies always carry
/// `seats == 0` and `remainder == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidacyAllocation {
    pub seats: u32,
    pub remainder: u128,
    pub eligible: bool,
}

/// Allocation bundle for one constituency. Conservation invariant: the
/// seat values in `by_candidacy` always sum to `seats`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstituencyAllocation {
    pub constituency_id: ConstituencyId,
    pub seats: u32,
    pub by_candidacy: BTreeMap<CandidacyId, CandidacyAllocation>,
}

impl ConstituencyAllocation {
    /// Sum of seats actually distributed (equals `seats` by construction).
    #[inline]
    pub fn seats_distributed(&self) -> u32 {
        self.by_candidacy.values().map(|a| a.seats).sum()
    }
}

/// Election-wide aggregate, keyed by constituency id.
pub type ElectionAllocation = BTreeMap<ConstituencyId, ConstituencyAllocation>;

// ----------------------------- Leaf modules -----------------------------

pub mod quotient;
pub mod threshold;
pub mod quota;

// ----------------------------- Strategies (public surface) -----------------------------

pub mod strategy {
    //! The calculation-strategy abstraction: one object per apportionment
    //! method, stateless and reentrant, selected by configuration key.
    //!
    //! Contract per strategy:
    //! - `can_apply` is checked by the orchestrator before any constituency
    //!   is processed; `Incompatible` aborts the run unchanged.
    //! - `calculate_seats` is pure per constituency (safe to fan out).
    //! - identity (`name`/`version`/`metadata`) is stable across calls.

    // File modules (actual implementations)
    pub mod standard;
    pub mod official;

    use std::collections::BTreeMap;
    use core::fmt;

    use ap_core::entities::{Constituency, ConstituencyTally, Election, NationalTally};
    use ap_core::tokens::{CandidacyId, ConstituencyId};
    use ap_core::variables::{ApportionMethod, Params};

    use crate::quota::{self, QuotaOutcome};
    use crate::{CandidacyAllocation, ElectionAllocation};

    /// Fatal calculation errors. Every kind aborts the whole election run;
    /// there is no constituency-level partial success.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum StrategyError {
        /// The election's type or configuration is structurally unsupported.
        Incompatible { strategy: &'static str, reason: String },
        /// A constituency configured with zero seats (upstream data corruption).
        DivisionByZero { constituency: ConstituencyId },
        /// Missing, unknown, or overflowing vote counts for a constituency.
        MalformedVoteData { constituency: ConstituencyId, detail: String },
        /// Seats to fill but no candidacy passes the applicable thresholds.
        NoEligibleCandidacies { constituency: ConstituencyId },
    }

    impl fmt::Display for StrategyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                StrategyError::Incompatible { strategy, reason } => {
                    write!(f, "strategy {strategy} cannot apply: {reason}")
                }
                StrategyError::DivisionByZero { constituency } => {
                    write!(f, "constituency {constituency} has zero seats")
                }
                StrategyError::MalformedVoteData { constituency, detail } => {
                    write!(f, "malformed vote data in {constituency}: {detail}")
                }
                StrategyError::NoEligibleCandidacies { constituency } => {
                    write!(f, "no eligible candidacy in {constituency}")
                }
            }
        }
    }

    impl std::error::Error for StrategyError {}

    /// Stable strategy identity for audit logging.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StrategyMetadata {
        pub name: &'static str,
        pub version: &'static str,
        pub quotient_rule: &'static str,
        pub threshold_rule: &'static str,
        pub tie_break_rule: &'static str,
    }

    /// One apportionment method. Implementations hold no mutable state, so a
    /// single instance can be shared across concurrent constituency runs.
    pub trait CalculationStrategy: Send + Sync {
        fn name(&self) -> &'static str;
        fn version(&self) -> &'static str;
        fn metadata(&self) -> StrategyMetadata;

        /// Structural applicability check; must run before any calculation.
        fn can_apply(&self, election: &Election, params: &Params) -> Result<(), StrategyError>;

        /// Apportion one constituency's seats. Pure: same inputs, same output.
        fn calculate_seats(
            &self,
            constituency: &Constituency,
            tally: &ConstituencyTally,
            national: &NationalTally,
            params: &Params,
        ) -> Result<BTreeMap<CandidacyId, CandidacyAllocation>, StrategyError>;

        /// Gender-quota pass over the full aggregate. The default delegates to
        /// the shared allocator with its fixed substitution order; a variant
        /// may override to change that order.
        fn apply_gender_quota(
            &self,
            election: &Election,
            params: &Params,
            allocation: &ElectionAllocation,
        ) -> QuotaOutcome {
            quota::apply_gender_quota(election, params, allocation)
        }
    }

    /// Explicit configuration-key → constructor map; resolved once at startup
    /// by the orchestrator (no global registry).
    pub fn strategy_for(method: ApportionMethod) -> Box<dyn CalculationStrategy> {
        match method {
            ApportionMethod::Standard => Box::new(standard::StandardStrategy),
            ApportionMethod::Official => Box::new(official::OfficialStrategy),
        }
    }

    // Re-export concrete strategies for direct construction in tests/callers.
    pub use official::OfficialStrategy;
    pub use standard::StandardStrategy;

    /// Shared defensive checks on one constituency's vote data. The caller
    /// already validated and persisted the tallies; the engine still refuses
    /// to compute on missing, unknown, or overflowing counts (fatal, §7).
    pub(crate) fn check_vote_data(
        constituency: &Constituency,
        tally: &ConstituencyTally,
    ) -> Result<(), StrategyError> {
        let cid = &constituency.constituency_id;
        if &tally.constituency_id != cid {
            return Err(StrategyError::MalformedVoteData {
                constituency: cid.clone(),
                detail: format!("tally belongs to {}", tally.constituency_id),
            });
        }
        for cand in &constituency.candidacies {
            if !tally.votes.contains_key(&cand.candidacy_id) {
                return Err(StrategyError::MalformedVoteData {
                    constituency: cid.clone(),
                    detail: format!("missing vote count for {}", cand.candidacy_id),
                });
            }
        }
        for id in tally.votes.keys() {
            if constituency.candidacy(id).is_none() {
                return Err(StrategyError::MalformedVoteData {
                    constituency: cid.clone(),
                    detail: format!("unknown candidacy {id} in tally"),
                });
            }
        }
        let sum: u128 = tally.votes.values().map(|&v| v as u128).sum();
        if sum > tally.expressed as u128 {
            return Err(StrategyError::MalformedVoteData {
                constituency: cid.clone(),
                detail: format!("vote sum {sum} exceeds expressed {}", tally.expressed),
            });
        }
        Ok(())
    }
}

// Convenience re-exports (pipeline imports these from crate root)
pub use quota::{QuotaOutcome, QuotaSubstitution, QuotaUnmet, Seating};
pub use strategy::{strategy_for, CalculationStrategy, StrategyError, StrategyMetadata};
