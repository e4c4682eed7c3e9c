//! Skill tiers derived from percentile rank

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percentile at or above which a player is placed in [`Tier::Platinum`]
pub const PLATINUM_PERCENTILE: f64 = 95.0;
pub const GOLD_PERCENTILE: f64 = 80.0;
pub const SILVER_PERCENTILE: f64 = 50.0;

/// Ordered skill tiers, lowest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Platinum];

    /// Map a percentile (0-100, higher is better) to a tier.
    ///
    /// Total over every input: anything that fails all thresholds, NaN
    /// included, lands in the lowest tier.
    pub fn classify(percentile: f64) -> Tier {
        if percentile >= PLATINUM_PERCENTILE {
            Tier::Platinum
        } else if percentile >= GOLD_PERCENTILE {
            Tier::Gold
        } else if percentile >= SILVER_PERCENTILE {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bronze" => Ok(Tier::Bronze),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tier_tests.rs"]
mod tier_tests;
