//! ap_core — Core types, domains, ordering helpers, and exact ratio math.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`ap_io`, `ap_algo`, `ap_pipeline`, `ap_cli`).
//!
//! - Output IDs: `RES:`
//! - Registry tokens: `ElectionId`, `ConstituencyId`, `CandidacyId`
//! - Configuration domains: `ApportionMethod`, `Params`
//! - Deterministic ordering helpers
//! - Integer-first numerics & ratio helpers
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod entities;
pub mod variables;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidId,
        InvalidToken,
        InvalidRatio,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidId => write!(f, "invalid id"),
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidRatio => write!(f, "invalid ratio"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod ids {
    //! Newtypes and parsers for output/digest identifiers.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_lower_hex_len(s: &str, n: usize) -> bool {
        s.len() == n && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// "RES:" + 64-hex (lowercase) — id of a certified apportionment result.
    #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct ResultId(String);

    impl ResultId {
        pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for ResultId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl FromStr for ResultId {
        type Err = CoreError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let rest = s.strip_prefix("RES:").ok_or(CoreError::InvalidId)?;
            if is_lower_hex_len(rest, 64) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidId) }
        }
    }
}

pub mod tokens {
    //! Registry token types (`ElectionId`, `ConstituencyId`, `CandidacyId`)
    //! with strict charset.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=64).contains(&len) { return false; }
        s.bytes().all(|b| matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
            b'_' | b'-' | b':' | b'.'
        ))
    }

    macro_rules! def_token {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
                }
            }
        }
    }

    def_token!(ElectionId);
    def_token!(ConstituencyId);
    def_token!(CandidacyId);
}

pub mod determinism {
    //! Stable ordering helpers.

    use core::cmp::Ordering;
    use crate::tokens::{CandidacyId, ConstituencyId};

    /// Compare by seat weight descending, then token ascending.
    /// This is the fixed visiting order of the quota pass.
    pub fn cmp_seats_desc_then_id(a: &(u32, &ConstituencyId), b: &(u32, &ConstituencyId)) -> Ordering {
        match b.0.cmp(&a.0) {
            Ordering::Equal => a.1.cmp(b.1),
            o => o,
        }
    }

    /// Same rule scoped to candidacies within one constituency.
    pub fn cmp_candidacy_seats_desc_then_id(a: &(u32, &CandidacyId), b: &(u32, &CandidacyId)) -> Ordering {
        match b.0.cmp(&a.0) {
            Ordering::Equal => a.1.cmp(b.1),
            o => o,
        }
    }
}

pub mod rounding {
    //! Integer-first ratio type and percent helpers.
    //!
    //! All comparisons on decision paths cross-multiply in u128; no floats.

    use crate::errors::CoreError;
    use core::cmp::Ordering;

    /// Exact non-negative ratio with positive denominator (reduced by GCD).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Ratio {
        pub num: u128,
        pub den: u128,
    }

    fn gcd_u128(mut a: u128, mut b: u128) -> u128 {
        while b != 0 {
            let r = a % b;
            a = b;
            b = r;
        }
        if a == 0 { 1 } else { a }
    }

    /// Construct a ratio, ensuring `den > 0` and reducing by GCD.
    pub fn new_ratio_checked(num: u128, den: u128) -> Result<Ratio, CoreError> {
        if den == 0 { return Err(CoreError::InvalidRatio); }
        let g = gcd_u128(num, den);
        Ok(Ratio { num: num / g, den: den / g })
    }

    /// Compare two ratios exactly (cross-multiply; exact fallback on overflow).
    pub fn compare_ratio_exact(a: &Ratio, b: &Ratio) -> Ordering {
        match (a.num.checked_mul(b.den), b.num.checked_mul(a.den)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                // Extreme magnitudes: compare integer parts, then recurse on fractional parts.
                let (qa, ra) = (a.num / a.den, a.num % a.den);
                let (qb, rb) = (b.num / b.den, b.num % b.den);
                match qa.cmp(&qb) {
                    Ordering::Equal => {
                        if ra == 0 && rb == 0 { Ordering::Equal }
                        else if ra == 0 { Ordering::Less }
                        else if rb == 0 { Ordering::Greater }
                        else {
                            // a_frac vs b_frac  ==  rb/ (den_b) inverted comparison
                            compare_ratio_exact(&Ratio { num: b.den, den: rb }, &Ratio { num: a.den, den: ra })
                        }
                    }
                    o => o,
                }
            }
        }
    }

    /// Integer test: `num / den >= pct%`, closed interval (exactly-at passes).
    /// With `den == 0` (nothing expressed) the cutoff is vacuous and passes.
    pub fn ge_percent(num: u64, den: u64, pct: u8) -> bool {
        (num as u128) * 100 >= (pct as u128) * (den as u128)
    }
}
