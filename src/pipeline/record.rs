//! Applicant input records

use serde::Serialize;

use super::stages::{FunnelStage, StageIndicators};

/// Names of the numeric model features, in matrix column order.
pub const FEATURE_NAMES: [&str; 5] = ["credit_score", "income", "age", "dti_ratio", "loan_amount"];

/// One immutable row of the loan application table.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantRecord {
    /// Applicant identifier from the source table
    pub applicant_id: String,
    pub credit_score: i64,
    pub income: f64,
    pub age: i64,
    pub dti_ratio: f64,
    pub loan_amount: f64,
    pub employment_status: String,
    pub funnel_stage: FunnelStage,
    /// Experiment arm label, carried through for the reporting layer
    pub experiment_group: String,
}

impl ApplicantRecord {
    /// Stage progression flags for this record.
    pub fn indicators(&self) -> StageIndicators {
        StageIndicators::from_stage(self.funnel_stage)
    }

    /// The numeric feature vector, ordered as [`FEATURE_NAMES`].
    pub fn features(&self) -> [f64; 5] {
        [
            self.credit_score as f64,
            self.income,
            self.age as f64,
            self.dti_ratio,
            self.loan_amount,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApplicantRecord {
        ApplicantRecord {
            applicant_id: "APP-0001".to_string(),
            credit_score: 720,
            income: 65_000.0,
            age: 34,
            dti_ratio: 0.28,
            loan_amount: 18_000.0,
            employment_status: "Employed".to_string(),
            funnel_stage: FunnelStage::Approved,
            experiment_group: "control".to_string(),
        }
    }

    #[test]
    fn test_feature_vector_order() {
        let rec = sample();
        let f = rec.features();
        assert_eq!(f[0], 720.0);
        assert_eq!(f[1], 65_000.0);
        assert_eq!(f[2], 34.0);
        assert_eq!(f[3], 0.28);
        assert_eq!(f[4], 18_000.0);
        assert_eq!(FEATURE_NAMES.len(), f.len());
    }

    #[test]
    fn test_indicators_from_record() {
        let rec = sample();
        let ind = rec.indicators();
        assert!(ind.passed_underwriting);
        assert!(!ind.funded);
    }
}
