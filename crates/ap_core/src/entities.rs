//! crates/ap_core/src/entities.rs
//! Domain entities shared across the engine (election, constituencies,
//! candidacies, tallies). Pure types + invariants + deterministic ordering
//! helpers. No I/O. The engine treats all of these as read-only snapshots
//! for the duration of one calculation run.

use core::fmt;

use crate::tokens::{CandidacyId, ConstituencyId, ElectionId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Construction/validation errors for domain entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityError {
    EmptyCollection,
    InvalidName,
    ZeroSeats,
    DuplicateToken,
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::EmptyCollection => f.write_str("empty collection"),
            EntityError::InvalidName => f.write_str("invalid name"),
            EntityError::ZeroSeats => f.write_str("constituency seat count must be >= 1"),
            EntityError::DuplicateToken => f.write_str("duplicate token"),
        }
    }
}

impl std::error::Error for EntityError {}

const NAME_MIN_LEN: usize = 1;
const NAME_MAX_LEN: usize = 200;

#[inline]
fn is_valid_name(s: &str) -> bool {
    let len = s.chars().count();
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len)
}

/// Declared gender of a list position. The quota pass targets one of these
/// (configured in `variables::Params`, default `Female`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gender {
    Female,
    Male,
}

/// One position on a candidacy list. `position` is the list rank (0 = head);
/// quota substitution promotes later positions, never reorders them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nominee {
    pub position: u32,
    pub name: String,
    pub gender: Gender,
}

/// A candidacy (list) running in exactly one constituency.
/// Invariant: `nominees.len() >= 1`, kept in ↑ position order, positions unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidacy {
    pub candidacy_id: CandidacyId,
    pub label: String,
    pub nominees: Vec<Nominee>,
}

impl Candidacy {
    pub fn new(
        candidacy_id: CandidacyId,
        label: String,
        mut nominees: Vec<Nominee>,
    ) -> Result<Self, EntityError> {
        if !is_valid_name(&label) {
            return Err(EntityError::InvalidName);
        }
        if nominees.is_empty() {
            return Err(EntityError::EmptyCollection);
        }
        nominees.sort_by_key(|n| n.position);
        if nominees.windows(2).any(|w| w[0].position == w[1].position) {
            return Err(EntityError::DuplicateToken);
        }
        Ok(Self { candidacy_id, label, nominees })
    }

    /// Nominee at a given list position, if any.
    #[inline]
    pub fn nominee_at(&self, position: u32) -> Option<&Nominee> {
        self.nominees.iter().find(|n| n.position == position)
    }
}

/// An electoral constituency: seat count plus the candidacies contesting it.
/// Invariant: `seats >= 1`; candidacies kept in ↑ CandidacyId order, ids unique.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constituency {
    pub constituency_id: ConstituencyId,
    pub name: String,
    pub seats: u32,
    pub candidacies: Vec<Candidacy>,
}

impl Constituency {
    pub fn new(
        constituency_id: ConstituencyId,
        name: String,
        seats: u32,
        mut candidacies: Vec<Candidacy>,
    ) -> Result<Self, EntityError> {
        if !is_valid_name(&name) {
            return Err(EntityError::InvalidName);
        }
        if seats == 0 {
            return Err(EntityError::ZeroSeats);
        }
        if candidacies.is_empty() {
            return Err(EntityError::EmptyCollection);
        }
        candidacies.sort_by(|a, b| a.candidacy_id.cmp(&b.candidacy_id));
        if candidacies.windows(2).any(|w| w[0].candidacy_id == w[1].candidacy_id) {
            return Err(EntityError::DuplicateToken);
        }
        Ok(Self { constituency_id, name, seats, candidacies })
    }

    /// Find a candidacy by id (candidacies are sorted; linear scan is fine at
    /// constituency scale).
    #[inline]
    pub fn candidacy(&self, id: &CandidacyId) -> Option<&Candidacy> {
        self.candidacies.iter().find(|c| &c.candidacy_id == id)
    }
}

/// Election type. Strategies declare which kinds they can apply to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ElectionKind {
    LegislativeProportional,
    PresidentialSingleSeat,
}

/// An election snapshot: identity, kind, and its constituencies.
/// Immutable once certification begins; configuration lives in `Params`.
/// Invariant: constituencies kept in ↑ ConstituencyId order, ids unique.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Election {
    pub election_id: ElectionId,
    pub name: String,
    pub kind: ElectionKind,
    pub constituencies: Vec<Constituency>,
}

impl Election {
    pub fn new(
        election_id: ElectionId,
        name: String,
        kind: ElectionKind,
        mut constituencies: Vec<Constituency>,
    ) -> Result<Self, EntityError> {
        if !is_valid_name(&name) {
            return Err(EntityError::InvalidName);
        }
        if constituencies.is_empty() {
            return Err(EntityError::EmptyCollection);
        }
        constituencies.sort_by(|a, b| a.constituency_id.cmp(&b.constituency_id));
        if constituencies.windows(2).any(|w| w[0].constituency_id == w[1].constituency_id) {
            return Err(EntityError::DuplicateToken);
        }
        Ok(Self { election_id, name, kind, constituencies })
    }

    #[inline]
    pub fn constituency(&self, id: &ConstituencyId) -> Option<&Constituency> {
        self.constituencies.iter().find(|c| &c.constituency_id == id)
    }

    /// Total seats across all constituencies.
    #[inline]
    pub fn total_seats(&self) -> u32 {
        self.constituencies.iter().map(|c| c.seats).sum()
    }
}

// ----------------------------- Vote tallies -----------------------------
// Vote totals are attached externally; candidacies do not own them.

use std::collections::BTreeMap;

/// Per-constituency tally: total expressed suffrages (valid votes counted
/// toward apportionment) and one count per candidacy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstituencyTally {
    pub constituency_id: ConstituencyId,
    pub expressed: u64,
    pub votes: BTreeMap<CandidacyId, u64>,
}

/// Full election tally, keyed by constituency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElectionTally {
    pub constituencies: BTreeMap<ConstituencyId, ConstituencyTally>,
}

/// National aggregates derived from an `ElectionTally`: the denominator and
/// per-candidacy numerators for the national threshold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NationalTally {
    pub expressed_total: u64,
    pub votes: BTreeMap<CandidacyId, u64>,
}

impl NationalTally {
    /// Aggregate national expressed total and per-candidacy national votes.
    pub fn from_tally(tally: &ElectionTally) -> Self {
        let mut expressed_total: u64 = 0;
        let mut votes: BTreeMap<CandidacyId, u64> = BTreeMap::new();
        for ct in tally.constituencies.values() {
            expressed_total += ct.expressed;
            for (id, &v) in &ct.votes {
                *votes.entry(id.clone()).or_insert(0) += v;
            }
        }
        Self { expressed_total, votes }
    }

    #[inline]
    pub fn votes_for(&self, id: &CandidacyId) -> u64 {
        self.votes.get(id).copied().unwrap_or(0)
    }
}
