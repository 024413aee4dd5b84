use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket boundaries mapping a 0-100 score to a level.
///
/// Assessment and display contexts use different upper boundaries and are
/// intentionally kept as two separate policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevelPolicy {
    /// Scores strictly below this are `Low`.
    pub low_below: f64,
    /// Scores strictly below this (and not low) are `Medium`.
    pub medium_below: f64,
}

impl RiskLevelPolicy {
    pub const ASSESSMENT: Self = Self {
        low_below: 30.0,
        medium_below: 70.0,
    };

    pub const DISPLAY: Self = Self {
        low_below: 30.0,
        medium_below: 60.0,
    };

    pub fn level(&self, score: f64) -> RiskLevel {
        if score < self.low_below {
            RiskLevel::Low
        } else if score < self.medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}
