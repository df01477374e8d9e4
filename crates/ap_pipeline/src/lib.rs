//! ap_pipeline — deterministic orchestration of one apportionment run
//! (resolve strategy → can_apply gate → allocate per constituency →
//! aggregate → quota pass → result document).
//!
//! This crate stays I/O-free on the hot path; bundle loading and result
//! hashing are delegated to `ap_io`, the math to `ap_algo`. A run either
//! produces a complete, certifiable `ResultDoc` or fails whole; there are
//! no partial results.

#![forbid(unsafe_code)]

use std::path::Path;

use thiserror::Error;

use ap_algo::{strategy_for, StrategyError};
use ap_core::entities::NationalTally;
use ap_io::loader::{load_bundle_from_path, LoadedBundle};

pub mod aggregate;
pub mod allocate;
pub mod build_result;

pub use build_result::{
    CandidacySeatsBlock, ConstituencyBlock, QuotaUnmetBlock, ResultDoc, StrategyBlock,
    SubstitutionBlock,
};

/// Engine identifiers stamped into every result (baked by the build).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
}

impl Default for EngineMeta {
    fn default() -> Self {
        Self {
            vendor: "ap".into(),
            name: "apportionment-engine".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Run context: a loaded, validated bundle plus engine identity.
#[derive(Debug)]
pub struct ApportionCtx {
    pub loaded: LoadedBundle,
    pub engine_meta: EngineMeta,
}

/// Single error surface for the orchestration. `Engine` carries the
/// strategy's fatal kinds (incompatible, zero seats, malformed votes, no
/// eligible candidacies) unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("bundle: {0}")]
    Bundle(#[from] ap_io::IoError),

    #[error("engine: {0}")]
    Engine(#[from] StrategyError),

    #[error("result build: {0}")]
    Build(String),
}

/// Run the full apportionment over an already-loaded bundle.
///
/// Order is fixed: the `can_apply` gate runs before any constituency is
/// touched, constituencies are processed in ascending id order, the first
/// failure aborts the run, and the quota pass runs exactly once over the
/// complete aggregate.
pub fn run_apportionment(ctx: &ApportionCtx) -> Result<ResultDoc, PipelineError> {
    let LoadedBundle { election, params, tally, digest_hex } = &ctx.loaded;

    let strategy = strategy_for(params.method());
    strategy.can_apply(election, params)?;

    let national = NationalTally::from_tally(tally);
    let allocation = allocate::allocate_all(strategy.as_ref(), election, tally, &national, params)?;
    let totals = aggregate::seat_totals(&allocation);
    let quota = strategy.apply_gender_quota(election, params, &allocation);

    build_result::build(
        &ctx.engine_meta,
        election,
        strategy.metadata(),
        digest_hex,
        &allocation,
        &totals,
        quota,
    )
    .map_err(|e| PipelineError::Build(e.to_string()))
}

/// Convenience: load a bundle from a local path and run it.
pub fn run_from_bundle_path(path: &Path, engine_meta: EngineMeta) -> Result<ResultDoc, PipelineError> {
    let loaded = load_bundle_from_path(path)?;
    run_apportionment(&ApportionCtx { loaded, engine_meta })
}
