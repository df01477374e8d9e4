//! Election-bundle loader: one JSON document per run carrying the election
//! snapshot, the engine configuration, and the certified tallies.
//!
//! Parsing goes through raw DTOs, then into the validating `ap_core`
//! constructors; the typed entities are never deserialized directly, so no
//! invariant can be bypassed by hand-edited input. The raw file digest is
//! kept for the audit record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use ap_core::entities::{
    Candidacy, Constituency, ConstituencyTally, Election, ElectionKind, ElectionTally, Gender,
    Nominee,
};
use ap_core::tokens::{CandidacyId, ConstituencyId, ElectionId};
use ap_core::variables::{validate_domains, Params};
use core::str::FromStr;

use crate::hasher::sha256_hex;
use crate::{IoError, IoResult};

/// A fully validated bundle plus the digest of its raw bytes.
#[derive(Clone, Debug)]
pub struct LoadedBundle {
    pub election: Election,
    pub params: Params,
    pub tally: ElectionTally,
    pub digest_hex: String,
}

/// Load and validate a bundle from a local file.
pub fn load_bundle_from_path(path: &Path) -> IoResult<LoadedBundle> {
    let bytes = std::fs::read(path)?;
    let mut loaded = load_bundle_from_slice(&bytes)?;
    loaded.digest_hex = sha256_hex(&bytes);
    Ok(loaded)
}

/// Load and validate a bundle from in-memory bytes.
pub fn load_bundle_from_slice(bytes: &[u8]) -> IoResult<LoadedBundle> {
    let raw: BundleRaw = serde_json::from_slice(bytes)?;

    let election = build_election(raw.election)?;
    validate_domains(&raw.params).map_err(|e| IoError::Invalid(e.to_string()))?;
    let tally = build_tally(raw.tally, &election)?;

    Ok(LoadedBundle {
        election,
        params: raw.params,
        tally,
        digest_hex: sha256_hex(bytes),
    })
}

// ----------------------------- Raw DTOs -----------------------------

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleRaw {
    election: ElectionRaw,
    #[serde(default)]
    params: Params,
    tally: TallyRaw,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ElectionRaw {
    election_id: String,
    name: String,
    kind: ElectionKind,
    constituencies: Vec<ConstituencyRaw>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstituencyRaw {
    constituency_id: String,
    name: String,
    seats: u32,
    candidacies: Vec<CandidacyRaw>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidacyRaw {
    candidacy_id: String,
    label: String,
    nominees: Vec<NomineeRaw>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NomineeRaw {
    position: u32,
    name: String,
    gender: Gender,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TallyRaw {
    constituencies: Vec<ConstituencyTallyRaw>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstituencyTallyRaw {
    constituency_id: String,
    expressed: u64,
    votes: BTreeMap<String, u64>,
}

// ----------------------------- Conversion -----------------------------

fn invalid(ctx: &str, e: impl core::fmt::Display) -> IoError {
    IoError::Invalid(format!("{ctx}: {e}"))
}

fn build_election(raw: ElectionRaw) -> IoResult<Election> {
    let election_id =
        ElectionId::from_str(&raw.election_id).map_err(|e| invalid("election_id", e))?;

    let mut constituencies = Vec::with_capacity(raw.constituencies.len());
    for c in raw.constituencies {
        let constituency_id =
            ConstituencyId::from_str(&c.constituency_id).map_err(|e| invalid("constituency_id", e))?;
        let mut candidacies = Vec::with_capacity(c.candidacies.len());
        for cand in c.candidacies {
            let candidacy_id =
                CandidacyId::from_str(&cand.candidacy_id).map_err(|e| invalid("candidacy_id", e))?;
            let nominees = cand
                .nominees
                .into_iter()
                .map(|n| Nominee { position: n.position, name: n.name, gender: n.gender })
                .collect();
            candidacies.push(
                Candidacy::new(candidacy_id, cand.label, nominees)
                    .map_err(|e| invalid(&format!("candidacy {}", cand.candidacy_id), e))?,
            );
        }
        constituencies.push(
            Constituency::new(constituency_id, c.name, c.seats, candidacies)
                .map_err(|e| invalid(&format!("constituency {}", c.constituency_id), e))?,
        );
    }

    Election::new(election_id, raw.name, raw.kind, constituencies)
        .map_err(|e| invalid("election", e))
}

fn build_tally(raw: TallyRaw, election: &Election) -> IoResult<ElectionTally> {
    let mut tally = ElectionTally::default();
    for ct in raw.constituencies {
        let constituency_id =
            ConstituencyId::from_str(&ct.constituency_id).map_err(|e| invalid("tally constituency_id", e))?;
        if election.constituency(&constituency_id).is_none() {
            return Err(IoError::Invalid(format!(
                "tally references unknown constituency {constituency_id}"
            )));
        }
        let mut votes = BTreeMap::new();
        for (id, v) in ct.votes {
            let cid = CandidacyId::from_str(&id).map_err(|e| invalid("tally candidacy_id", e))?;
            votes.insert(cid, v);
        }
        let prev = tally.constituencies.insert(
            constituency_id.clone(),
            ConstituencyTally { constituency_id: constituency_id.clone(), expressed: ct.expressed, votes },
        );
        if prev.is_some() {
            return Err(IoError::Invalid(format!(
                "duplicate tally for constituency {constituency_id}"
            )));
        }
    }

    // Every constituency needs its tally before a run can start.
    for c in &election.constituencies {
        if !tally.constituencies.contains_key(&c.constituency_id) {
            return Err(IoError::Invalid(format!(
                "missing tally for constituency {}",
                c.constituency_id
            )));
        }
    }
    Ok(tally)
}
