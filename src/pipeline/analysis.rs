//! Analysis orchestration
//!
//! The single-pass batch pipeline: indicators, the survival model cascade,
//! risk composition, cohort segmentation, and feature importance. The core
//! takes data as an explicit input parameter and does no I/O of its own.

use polars::prelude::*;
use serde::Serialize;

use crate::report::importance::{extract_feature_importance, FeatureImportance};

use super::cascade::{train_model_bank, ModelBank, SurvivalProbabilities};
use super::cohort::{segment_cohorts, CohortMetrics};
use super::model::FitConfig;
use super::record::ApplicantRecord;
use super::risk::{compose_risk, RiskPolicy};
use super::stages::{FunnelStage, StageIndicators};

/// Settings for a full analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisConfig {
    pub policy: RiskPolicy,
    pub fit: FitConfig,
}

/// One applicant annotated with everything the pipeline derived for it.
#[derive(Debug, Clone)]
pub struct ScoredApplicant {
    pub record: ApplicantRecord,
    pub indicators: StageIndicators,
    pub probabilities: SurvivalProbabilities,
    pub abandonment_risk: f64,
}

/// Per-stage applicant counts for the drop-off summary.
#[derive(Debug, Clone, Serialize)]
pub struct StageCount {
    pub stage: &'static str,
    pub count: usize,
    /// Share of all applicants currently sitting at this stage, in [0, 1]
    pub share: f64,
}

/// Results of a full analysis run.
pub struct AnalysisReport {
    /// Six-band cohort table
    pub cohorts: Vec<CohortMetrics>,
    /// Per-stage model coefficient magnitudes
    pub feature_importance: Vec<FeatureImportance>,
    /// Every input applicant with derived annotations, input order preserved
    pub applicants: Vec<ScoredApplicant>,
    /// Transitions whose model was skipped (degenerate or non-convergent),
    /// with the reason. The cohort rows touched by these are low-confidence.
    pub fallback_transitions: Vec<String>,
}

/// Run the complete analysis pipeline on an in-memory dataset.
///
/// Deterministic for a given dataset and config. A degenerate transition
/// degrades gracefully: its model is skipped, remaining stages still train,
/// and the affected fallback is reported.
pub fn run_analysis(records: &[ApplicantRecord], config: &AnalysisConfig) -> AnalysisReport {
    let (bank, probabilities) = train_model_bank(records, &config.fit);

    let applicants: Vec<ScoredApplicant> = records
        .iter()
        .zip(probabilities.iter())
        .map(|(record, probs)| ScoredApplicant {
            abandonment_risk: compose_risk(record, probs, config.policy),
            indicators: record.indicators(),
            probabilities: *probs,
            record: record.clone(),
        })
        .collect();

    let cohorts = segment_cohorts(&applicants);
    let feature_importance = extract_feature_importance(&bank);
    let fallback_transitions = fallback_labels(&bank);

    AnalysisReport {
        cohorts,
        feature_importance,
        applicants,
        fallback_transitions,
    }
}

fn fallback_labels(bank: &ModelBank) -> Vec<String> {
    bank.skipped
        .iter()
        .map(|s| format!("{}: {}", s.transition.as_str(), s.reason))
        .collect()
}

/// Per-stage counts and shares, in funnel order.
pub fn dropoff_summary(records: &[ApplicantRecord]) -> Vec<StageCount> {
    let total = records.len().max(1) as f64;
    FunnelStage::ALL
        .iter()
        .map(|stage| {
            let count = records.iter().filter(|r| r.funnel_stage == *stage).count();
            StageCount {
                stage: stage.as_str(),
                count,
                share: count as f64 / total,
            }
        })
        .collect()
}

/// Materialize the scored applicants as a polars DataFrame for the external
/// reporting surface. Absent probabilities stay null, never zero.
pub fn scored_to_dataframe(applicants: &[ScoredApplicant]) -> PolarsResult<DataFrame> {
    let ids: Vec<String> = applicants.iter().map(|a| a.record.applicant_id.clone()).collect();
    let stages: Vec<&str> = applicants.iter().map(|a| a.record.funnel_stage.as_str()).collect();
    let completed: Vec<bool> = applicants.iter().map(|a| a.indicators.completed_app).collect();
    let uploaded: Vec<bool> = applicants.iter().map(|a| a.indicators.uploaded_docs).collect();
    let underwritten: Vec<bool> = applicants.iter().map(|a| a.indicators.passed_underwriting).collect();
    let funded: Vec<bool> = applicants.iter().map(|a| a.indicators.funded).collect();
    let prob_complete: Vec<Option<f64>> =
        applicants.iter().map(|a| a.probabilities.app_completion).collect();
    let prob_upload: Vec<Option<f64>> =
        applicants.iter().map(|a| a.probabilities.doc_upload).collect();
    let prob_underwriting: Vec<Option<f64>> =
        applicants.iter().map(|a| a.probabilities.underwriting).collect();
    let prob_funding: Vec<Option<f64>> =
        applicants.iter().map(|a| a.probabilities.funding).collect();
    let risk: Vec<f64> = applicants.iter().map(|a| a.abandonment_risk).collect();

    DataFrame::new(vec![
        Column::new("applicant_id".into(), ids),
        Column::new("funnel_stage".into(), stages),
        Column::new("completed_app".into(), completed),
        Column::new("uploaded_docs".into(), uploaded),
        Column::new("passed_underwriting".into(), underwritten),
        Column::new("funded".into(), funded),
        Column::new("prob_complete_app".into(), prob_complete),
        Column::new("prob_upload_docs".into(), prob_upload),
        Column::new("prob_underwriting".into(), prob_underwriting),
        Column::new("prob_funding".into(), prob_funding),
        Column::new("abandonment_risk".into(), risk),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, credit: i64, stage: FunnelStage) -> ApplicantRecord {
        ApplicantRecord {
            applicant_id: id.to_string(),
            credit_score: credit,
            income: 45_000.0 + (credit as f64) * 20.0,
            age: 22 + credit % 45,
            dti_ratio: 0.15 + (credit % 9) as f64 * 0.05,
            loan_amount: 6_000.0 + (credit % 13) as f64 * 3_000.0,
            employment_status: "Employed".to_string(),
            funnel_stage: stage,
            experiment_group: "control".to_string(),
        }
    }

    fn dataset() -> Vec<ApplicantRecord> {
        let mut out = Vec::new();
        let stages = FunnelStage::ALL;
        for i in 0..60 {
            let stage = stages[i % 5];
            out.push(record(&format!("R{}", i), 480 + (i as i64) * 6, stage));
        }
        out
    }

    #[test]
    fn test_dropoff_summary_counts_and_shares() {
        let records = dataset();
        let summary = dropoff_summary(&records);
        assert_eq!(summary.len(), 5);
        let total: usize = summary.iter().map(|s| s.count).sum();
        assert_eq!(total, 60);
        let share_sum: f64 = summary.iter().map(|s| s.share).sum();
        assert!((share_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dropoff_summary_empty_dataset() {
        let summary = dropoff_summary(&[]);
        assert!(summary.iter().all(|s| s.count == 0 && s.share == 0.0));
    }

    #[test]
    fn test_run_analysis_preserves_input_order() {
        let records = dataset();
        let report = run_analysis(&records, &AnalysisConfig::default());
        assert_eq!(report.applicants.len(), records.len());
        for (a, r) in report.applicants.iter().zip(records.iter()) {
            assert_eq!(a.record.applicant_id, r.applicant_id);
        }
    }

    #[test]
    fn test_scored_dataframe_shape() {
        let records = dataset();
        let report = run_analysis(&records, &AnalysisConfig::default());
        let df = scored_to_dataframe(&report.applicants).unwrap();
        assert_eq!(df.height(), 60);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert!(names.contains(&"abandonment_risk".to_string()));
        assert!(names.contains(&"prob_funding".to_string()));
    }

    #[test]
    fn test_absent_probabilities_are_null_in_dataframe() {
        let records = dataset();
        let report = run_analysis(&records, &AnalysisConfig::default());
        let df = scored_to_dataframe(&report.applicants).unwrap();

        // Applicants stalled at Application Started were never evaluated for
        // the funding transition.
        let stalled = records
            .iter()
            .filter(|r| r.funnel_stage == FunnelStage::ApplicationStarted)
            .count();
        assert!(df.column("prob_funding").unwrap().null_count() >= stalled);
    }
}
