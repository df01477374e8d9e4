//! crates/ap_core/src/variables.rs
//! Election configuration (`Params`) and its domains.
//!
//! Notes:
//! - `method` selects the calculation strategy by key; default is `standard`.
//! - Threshold/quota percentages are whole percents in 0..=100; `None`
//!   disables the corresponding check/pass.
//! - `Params` is read once per run; nothing here mutates after load.

use crate::entities::Gender;
use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed set of apportionment methods known at build time. Strategy
/// construction happens in `ap_algo`; this is only the configuration key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ApportionMethod {
    Standard,
    Official,
}

impl ApportionMethod {
    /// Parse a configuration key (`standard` | `official`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "standard" => Some(Self::Standard),
            "official" => Some(Self::Official),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Official => "official",
        }
    }
}

impl Default for ApportionMethod {
    fn default() -> Self { Self::Standard }
}

/// Per-election engine configuration. Supplied by the caller alongside the
/// election snapshot; the engine never persists or mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    #[cfg_attr(feature = "serde", serde(default))]
    pub method: ApportionMethod,

    /// National vote-share minimum (percent of national expressed suffrages).
    #[cfg_attr(feature = "serde", serde(default))]
    pub national_threshold_pct: Option<u8>,

    /// Constituency vote-share minimum (percent of local expressed suffrages).
    #[cfg_attr(feature = "serde", serde(default))]
    pub constituency_threshold_pct: Option<u8>,

    /// Election-wide minimum share of seats for `quota_gender`; `None`
    /// disables the quota pass.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gender_quota_pct: Option<u8>,

    #[cfg_attr(feature = "serde", serde(default = "default_quota_gender"))]
    pub quota_gender: Gender,
}

fn default_quota_gender() -> Gender { Gender::Female }

impl Default for Params {
    fn default() -> Self {
        Self {
            method: ApportionMethod::Standard,
            national_threshold_pct: None,
            constituency_threshold_pct: None,
            gender_quota_pct: None,
            quota_gender: Gender::Female,
        }
    }
}

impl Params {
    #[inline]
    pub fn method(&self) -> ApportionMethod { self.method }

    #[inline]
    pub fn national_threshold_pct(&self) -> Option<u8> { self.national_threshold_pct }

    #[inline]
    pub fn constituency_threshold_pct(&self) -> Option<u8> { self.constituency_threshold_pct }

    #[inline]
    pub fn gender_quota_pct(&self) -> Option<u8> { self.gender_quota_pct }

    #[inline]
    pub fn quota_gender(&self) -> Gender { self.quota_gender }
}

/// Domain checks for all percent-valued variables (0..=100).
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    for (key, v) in [
        ("national_threshold_pct", p.national_threshold_pct),
        ("constituency_threshold_pct", p.constituency_threshold_pct),
        ("gender_quota_pct", p.gender_quota_pct),
    ] {
        if let Some(pct) = v {
            if pct > 100 {
                return Err(CoreError::DomainOutOfRange(key));
            }
        }
    }
    Ok(())
}
