//! Funnel analysis export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::analysis::{AnalysisReport, StageCount};
use crate::pipeline::cohort::CohortMetrics;
use crate::pipeline::economic::{EconomicAssumptions, EconomicImpactRecord};
use crate::pipeline::risk::RiskPolicy;

use super::importance::FeatureImportance;

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// funnelrisk version
    pub funnelrisk_version: String,
    /// Input file path
    pub input_file: String,
    /// Risk composition policy used
    pub risk_policy: String,
    /// Economic assumptions applied
    pub assumptions: EconomicAssumptions,
}

/// Summary statistics for the run
#[derive(Serialize)]
pub struct ReportSummary {
    /// Total applicants analyzed
    pub total_applicants: usize,
    /// Mean abandonment risk across all applicants
    pub mean_abandonment_risk: f64,
    /// Applicants per funnel stage
    pub stage_counts: Vec<StageCount>,
    /// Number of distinct cohorts
    pub cohort_count: usize,
    /// Transitions whose model training was skipped, with the reason
    pub fallback_transitions: Vec<String>,
}

/// Complete funnel analysis export
#[derive(Serialize)]
pub struct FunnelReportExport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub cohorts: Vec<CohortMetrics>,
    pub feature_importance: Vec<FeatureImportance>,
    pub economic_impact: Vec<EconomicImpactRecord>,
}

/// Parameters for the report export
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub policy: RiskPolicy,
    pub assumptions: EconomicAssumptions,
}

/// Export the full analysis to a JSON file with metadata
pub fn export_funnel_report(
    report: &AnalysisReport,
    economic_impact: &[EconomicImpactRecord],
    stage_counts: Vec<StageCount>,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let mean_abandonment_risk = if report.applicants.is_empty() {
        0.0
    } else {
        report
            .applicants
            .iter()
            .map(|a| a.abandonment_risk)
            .sum::<f64>()
            / report.applicants.len() as f64
    };

    let export = FunnelReportExport {
        metadata: ReportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            funnelrisk_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            risk_policy: params.policy.to_string(),
            assumptions: params.assumptions,
        },
        summary: ReportSummary {
            total_applicants: report.applicants.len(),
            mean_abandonment_risk,
            stage_counts,
            cohort_count: report.cohorts.len(),
            fallback_transitions: report.fallback_transitions.clone(),
        },
        cohorts: report.cohorts.clone(),
        feature_importance: report.feature_importance.clone(),
        economic_impact: economic_impact.to_vec(),
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize funnel report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write funnel report to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis::{run_analysis, AnalysisConfig};
    use crate::pipeline::record::ApplicantRecord;
    use crate::pipeline::stages::FunnelStage;
    use tempfile::tempdir;

    fn dataset() -> Vec<ApplicantRecord> {
        (0..40)
            .map(|i| ApplicantRecord {
                applicant_id: format!("A{}", i),
                credit_score: 520 + (i as i64) * 9,
                income: 30_000.0 + (i as f64) * 1_500.0,
                age: 21 + (i as i64) % 48,
                dti_ratio: 0.10 + (i % 10) as f64 * 0.05,
                loan_amount: 4_000.0 + (i % 9) as f64 * 5_000.0,
                employment_status: "Employed".to_string(),
                funnel_stage: FunnelStage::ALL[i % 5],
                experiment_group: "control".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_export_writes_valid_json() {
        let records = dataset();
        let report = run_analysis(&records, &AnalysisConfig::default());
        let impact = crate::pipeline::economic::run_economic_impact_analysis(
            &records,
            &EconomicAssumptions::default(),
        );
        let stage_counts = crate::pipeline::analysis::dropoff_summary(&records);

        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_funnel_report(
            &report,
            &impact,
            stage_counts,
            &path,
            &ExportParams {
                input_file: "applicants.csv",
                policy: RiskPolicy::Cascade,
                assumptions: EconomicAssumptions::default(),
            },
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["total_applicants"], 40);
        assert_eq!(value["metadata"]["risk_policy"], "cascade");
        assert!(value["cohorts"].is_array());
        assert!(value["economic_impact"].is_array());
    }
}
