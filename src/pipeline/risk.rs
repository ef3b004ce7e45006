//! Abandonment risk composition
//!
//! Two policies compose per-transition survival probabilities into a single
//! abandonment-risk score. The cascade policy multiplies every probability the
//! applicant was actually evaluated for; transitions with an absent value are
//! excluded from the product, never treated as zero. The heuristic policy is
//! an additive penalty score used as a cross-check and as the fallback when no
//! cascade model survived training.

use serde::Serialize;

use super::cascade::SurvivalProbabilities;
use super::record::ApplicantRecord;

/// Decimal places risk scores are rounded to, for reproducible reporting.
const RISK_PRECISION: f64 = 1e4;

/// Risk composition policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RiskPolicy {
    /// Multiplicative survival cascade: risk = 1 - product of available
    /// survival probabilities. Primary policy.
    #[default]
    Cascade,
    /// Additive static penalties with an optional model correction.
    /// Fallback / cross-check policy.
    Heuristic,
}

impl std::fmt::Display for RiskPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskPolicy::Cascade => write!(f, "cascade"),
            RiskPolicy::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl std::str::FromStr for RiskPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cascade" => Ok(RiskPolicy::Cascade),
            "heuristic" => Ok(RiskPolicy::Heuristic),
            _ => Err(format!(
                "Unknown risk policy: '{}'. Use 'cascade' or 'heuristic'.",
                s
            )),
        }
    }
}

/// Compose one abandonment-risk score for an applicant, in [0, 1],
/// rounded to 4 decimal places.
///
/// Under the cascade policy an applicant with no evaluated transitions at all
/// (every model skipped) falls back to the heuristic rather than reporting a
/// meaningless zero.
pub fn compose_risk(
    record: &ApplicantRecord,
    probs: &SurvivalProbabilities,
    policy: RiskPolicy,
) -> f64 {
    let risk = match policy {
        RiskPolicy::Cascade => {
            let available = probs.available();
            if available.is_empty() {
                heuristic_risk(record, probs)
            } else {
                let survival: f64 = available.iter().product();
                1.0 - survival
            }
        }
        RiskPolicy::Heuristic => heuristic_risk(record, probs),
    };

    round_risk(risk.clamp(0.0, 1.0))
}

/// Static penalty score. Thresholds come from standard underwriting rules of
/// thumb (subprime credit, the 43% qualified-mortgage DTI line, large loans,
/// unemployment), plus a correction from the first-stage model when present.
fn heuristic_risk(record: &ApplicantRecord, probs: &SurvivalProbabilities) -> f64 {
    let mut score = 0.0;

    if record.credit_score < 650 {
        score += 0.3;
    }
    if record.dti_ratio > 0.43 {
        score += 0.2;
    }
    if record.loan_amount > 50_000.0 {
        score += 0.1;
    }
    if record.employment_status == "Unemployed" {
        score += 0.3;
    }
    if let Some(p) = probs.app_completion {
        score += (1.0 - p) * 0.2;
    }

    score.min(1.0)
}

fn round_risk(risk: f64) -> f64 {
    (risk * RISK_PRECISION).round() / RISK_PRECISION
}
