use serde::Serialize;

use supplysignal_common::SupplySignalError;

/// Outcome of a scorer: either the computed value or a documented fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Scored {
    Computed { value: f64 },
    Fallback { value: f64, reason: &'static str },
}

impl Scored {
    pub fn value(&self) -> f64 {
        match self {
            Scored::Computed { value } | Scored::Fallback { value, .. } => *value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Scored::Fallback { .. })
    }

    /// Typed cause of a fallback, for logging at the recovery site.
    pub fn cause(&self) -> Option<SupplySignalError> {
        match self {
            Scored::Computed { .. } => None,
            Scored::Fallback { reason, .. } => {
                Some(SupplySignalError::UnexpectedComputation((*reason).to_string()))
            }
        }
    }
}

/// Clamp a raw score into [0, 100]. Non-finite input scores 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_score_bounds() {
        assert_eq!(clamp_score(140.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(42.5), 42.5);
    }

    #[test]
    fn scored_exposes_value_for_both_variants() {
        assert_eq!(Scored::Computed { value: 10.0 }.value(), 10.0);
        let fb = Scored::Fallback { value: 15.0, reason: "x" };
        assert!(fb.is_fallback());
        assert_eq!(fb.value(), 15.0);
        assert!(Scored::Computed { value: 1.0 }.cause().is_none());
    }

    #[test]
    fn fallback_cause_is_unexpected_computation() {
        let fb = Scored::Fallback { value: 15.0, reason: "non-finite impact fields" };
        assert!(matches!(
            fb.cause(),
            Some(SupplySignalError::UnexpectedComputation(reason)) if reason == "non-finite impact fields"
        ));
    }
}
