use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Magnitude below which `NearZero` treats a reading as "no data".
pub const NEAR_ZERO_EPSILON: f64 = 1e-4;

/// How a zero-ish NDVI reading is interpreted. Exactly one rule is active.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidityRule {
    /// Only an exact `0.0` is the no-data sentinel.
    #[default]
    ExactZero,
    /// Anything with `|v| < 1e-4` is the no-data sentinel.
    NearZero,
}

impl Display for ValidityRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactZero => write!(f, "exact_zero"),
            Self::NearZero => write!(f, "near_zero"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown validity rule: {0}")]
pub struct ValidityRuleParseError(pub String);

impl FromStr for ValidityRule {
    type Err = ValidityRuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact_zero" | "exact-zero" | "exact" => Ok(Self::ExactZero),
            "near_zero" | "near-zero" | "epsilon" => Ok(Self::NearZero),
            _ => Err(ValidityRuleParseError(s.to_string())),
        }
    }
}

pub fn is_usable(raw: Option<f64>, rule: ValidityRule) -> bool {
    let Some(value) = raw else {
        return false;
    };
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return false;
    }
    match rule {
        ValidityRule::ExactZero => value != 0.0,
        ValidityRule::NearZero => value.abs() >= NEAR_ZERO_EPSILON,
    }
}
