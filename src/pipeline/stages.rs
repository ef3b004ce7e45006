//! Funnel stage labels and per-applicant progression indicators

use std::str::FromStr;

use serde::Serialize;

use super::error::FunnelError;

/// One checkpoint in the loan application process.
///
/// Applicants progress through the stages in this fixed order, so a later
/// stage implies all earlier stages were passed. The derive order gives the
/// funnel ordering (`Funded` is the terminal stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FunnelStage {
    ApplicationStarted,
    DocumentsUploaded,
    UnderwritingReview,
    Approved,
    Funded,
}

impl FunnelStage {
    /// All stages in funnel order.
    pub const ALL: [FunnelStage; 5] = [
        FunnelStage::ApplicationStarted,
        FunnelStage::DocumentsUploaded,
        FunnelStage::UnderwritingReview,
        FunnelStage::Approved,
        FunnelStage::Funded,
    ];

    /// The label used in the input table and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::ApplicationStarted => "Application Started",
            FunnelStage::DocumentsUploaded => "Documents Uploaded",
            FunnelStage::UnderwritingReview => "Underwriting Review",
            FunnelStage::Approved => "Approved",
            FunnelStage::Funded => "Funded",
        }
    }
}

impl std::fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FunnelStage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Application Started" => Ok(FunnelStage::ApplicationStarted),
            "Documents Uploaded" => Ok(FunnelStage::DocumentsUploaded),
            "Underwriting Review" => Ok(FunnelStage::UnderwritingReview),
            "Approved" => Ok(FunnelStage::Approved),
            "Funded" => Ok(FunnelStage::Funded),
            other => Err(FunnelError::InvalidStage {
                label: other.to_string(),
            }),
        }
    }
}

/// Boolean progression flags derived from a record's funnel stage.
///
/// Each flag is true iff the stage is at or beyond the corresponding boundary,
/// so `funded` implies `passed_underwriting` implies `uploaded_docs` implies
/// `completed_app`. Derived, never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageIndicators {
    /// Reached at least Documents Uploaded
    pub completed_app: bool,
    /// Reached at least Underwriting Review
    pub uploaded_docs: bool,
    /// Reached at least Approved
    pub passed_underwriting: bool,
    /// Reached Funded
    pub funded: bool,
}

impl StageIndicators {
    /// Derive the four progression flags from a funnel stage.
    pub fn from_stage(stage: FunnelStage) -> Self {
        Self {
            completed_app: stage >= FunnelStage::DocumentsUploaded,
            uploaded_docs: stage >= FunnelStage::UnderwritingReview,
            passed_underwriting: stage >= FunnelStage::Approved,
            funded: stage >= FunnelStage::Funded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trip() {
        for stage in FunnelStage::ALL {
            let parsed: FunnelStage = stage.as_str().parse().unwrap();
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let result = "Pre-Qualification".parse::<FunnelStage>();
        assert!(matches!(
            result,
            Err(FunnelError::InvalidStage { ref label }) if label == "Pre-Qualification"
        ));
    }

    #[test]
    fn test_stage_ordering() {
        assert!(FunnelStage::ApplicationStarted < FunnelStage::DocumentsUploaded);
        assert!(FunnelStage::Approved < FunnelStage::Funded);
    }

    #[test]
    fn test_indicators_monotone() {
        // funded=1 => passed_underwriting=1 => uploaded_docs=1 => completed_app=1
        for stage in FunnelStage::ALL {
            let ind = StageIndicators::from_stage(stage);
            if ind.funded {
                assert!(ind.passed_underwriting);
            }
            if ind.passed_underwriting {
                assert!(ind.uploaded_docs);
            }
            if ind.uploaded_docs {
                assert!(ind.completed_app);
            }
        }
    }

    #[test]
    fn test_indicators_per_stage() {
        let started = StageIndicators::from_stage(FunnelStage::ApplicationStarted);
        assert!(!started.completed_app && !started.funded);

        let uploaded = StageIndicators::from_stage(FunnelStage::DocumentsUploaded);
        assert!(uploaded.completed_app && !uploaded.uploaded_docs);

        let review = StageIndicators::from_stage(FunnelStage::UnderwritingReview);
        assert!(review.uploaded_docs && !review.passed_underwriting);

        let approved = StageIndicators::from_stage(FunnelStage::Approved);
        assert!(approved.passed_underwriting && !approved.funded);

        let funded = StageIndicators::from_stage(FunnelStage::Funded);
        assert!(funded.completed_app && funded.uploaded_docs && funded.passed_underwriting && funded.funded);
    }
}
