//! Economic impact scoring
//!
//! Translates per-cohort, per-stage attrition into lost revenue, improvement
//! potential, ROI, and a volume-weighted priority score. Cohorts here use the
//! minimal three-band grouping (age, DTI, credit); an applicant contributes to
//! a stage's loss iff it stalled exactly at that stage (its funnel stage
//! equals the stage, so it never reached funding).

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use super::cohort::{age_group, credit_group, dti_group};
use super::record::ApplicantRecord;
use super::stages::FunnelStage;

/// Assumed recoverable fraction of losses per pre-funding stage, used for the
/// conversion-improvement estimate (later stages are assumed more fixable).
const STAGE_IMPROVEMENT_RATES: [(FunnelStage, f64); 4] = [
    (FunnelStage::ApplicationStarted, 0.10),
    (FunnelStage::DocumentsUploaded, 0.15),
    (FunnelStage::UnderwritingReview, 0.20),
    (FunnelStage::Approved, 0.25),
];

/// Business assumptions scaling lost loan volume into revenue and
/// recoverable-value estimates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EconomicAssumptions {
    /// Fraction of funded loan volume realized as revenue
    pub profit_margin: f64,
    /// Fraction of total losses assumed recoverable through intervention
    pub improvement_factor: f64,
    /// Acquisition cost per application, for the ROI denominator
    pub cost_per_application: f64,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            profit_margin: 0.05,
            improvement_factor: 0.2,
            cost_per_application: 50.0,
        }
    }
}

/// Economic impact for one three-band cohort.
///
/// Derived entirely from the cohort's applicant-level loan amounts; has no
/// independent lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct EconomicImpactRecord {
    pub age_group: &'static str,
    pub dti_group: &'static str,
    pub credit_group: &'static str,
    pub total_applications: usize,

    pub lost_at_application_started: f64,
    pub lost_revenue_application_started: f64,
    pub lost_at_documents_uploaded: f64,
    pub lost_revenue_documents_uploaded: f64,
    pub lost_at_underwriting_review: f64,
    pub lost_revenue_underwriting_review: f64,
    pub lost_at_approved: f64,
    pub lost_revenue_approved: f64,

    pub total_lost_revenue: f64,
    pub improvement_potential: f64,
    /// improvement_potential / (applicant count x cost per application);
    /// zero-cost denominator yields 0 by convention
    pub roi_ratio: f64,
    /// Volume-weighted value score used only for ranking, not a probability
    pub priority_score: f64,
    pub conversion_improvement_value: f64,
}

impl EconomicImpactRecord {
    /// Readable pipe-joined cohort label.
    pub fn cohort_label(&self) -> String {
        format!("{} | {} | {}", self.age_group, self.dti_group, self.credit_group)
    }

    fn lost_at(&self, stage: FunnelStage) -> f64 {
        match stage {
            FunnelStage::ApplicationStarted => self.lost_at_application_started,
            FunnelStage::DocumentsUploaded => self.lost_at_documents_uploaded,
            FunnelStage::UnderwritingReview => self.lost_at_underwriting_review,
            FunnelStage::Approved => self.lost_at_approved,
            FunnelStage::Funded => 0.0,
        }
    }
}

/// Compute per-cohort economic impact, sorted descending by priority score.
///
/// Cohorts are independent; scoring is sharded across worker threads with no
/// shared mutable state. Zero-member cohorts never appear (the grouping only
/// produces observed keys).
pub fn run_economic_impact_analysis(
    records: &[ApplicantRecord],
    assumptions: &EconomicAssumptions,
) -> Vec<EconomicImpactRecord> {
    let mut groups: HashMap<(&'static str, &'static str, &'static str), Vec<&ApplicantRecord>> =
        HashMap::new();
    for r in records {
        let key = (age_group(r.age), dti_group(r.dti_ratio), credit_group(r.credit_score));
        groups.entry(key).or_default().push(r);
    }

    let mut impact: Vec<EconomicImpactRecord> = groups
        .into_par_iter()
        .map(|(key, members)| score_cohort(key, &members, assumptions))
        .collect();

    impact.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                (a.age_group, a.dti_group, a.credit_group).cmp(&(
                    b.age_group,
                    b.dti_group,
                    b.credit_group,
                ))
            })
    });
    impact
}

fn score_cohort(
    key: (&'static str, &'static str, &'static str),
    members: &[&ApplicantRecord],
    assumptions: &EconomicAssumptions,
) -> EconomicImpactRecord {
    let lost_amount = |stage: FunnelStage| -> f64 {
        members
            .iter()
            .filter(|r| r.funnel_stage == stage)
            .map(|r| r.loan_amount)
            .sum()
    };

    let lost_started = lost_amount(FunnelStage::ApplicationStarted);
    let lost_docs = lost_amount(FunnelStage::DocumentsUploaded);
    let lost_review = lost_amount(FunnelStage::UnderwritingReview);
    let lost_approved = lost_amount(FunnelStage::Approved);

    let margin = assumptions.profit_margin;
    let total_lost = lost_started + lost_docs + lost_review + lost_approved;
    let total_lost_revenue = total_lost * margin;
    let improvement_potential = total_lost_revenue * assumptions.improvement_factor;

    let total_applications = members.len();
    let total_cost = total_applications as f64 * assumptions.cost_per_application;
    let roi_ratio = if total_cost > 0.0 {
        improvement_potential / total_cost
    } else {
        0.0
    };

    let priority_score = improvement_potential * total_applications as f64 / 1000.0;

    let mut record = EconomicImpactRecord {
        age_group: key.0,
        dti_group: key.1,
        credit_group: key.2,
        total_applications,
        lost_at_application_started: lost_started,
        lost_revenue_application_started: lost_started * margin,
        lost_at_documents_uploaded: lost_docs,
        lost_revenue_documents_uploaded: lost_docs * margin,
        lost_at_underwriting_review: lost_review,
        lost_revenue_underwriting_review: lost_review * margin,
        lost_at_approved: lost_approved,
        lost_revenue_approved: lost_approved * margin,
        total_lost_revenue,
        improvement_potential,
        roi_ratio,
        priority_score,
        conversion_improvement_value: 0.0,
    };
    record.conversion_improvement_value = conversion_improvement_value(&record, margin);
    record
}

/// Value of improving conversion at each stage: per-stage recoverable rate
/// times the stage's lost loan volume, at the profit margin.
fn conversion_improvement_value(record: &EconomicImpactRecord, profit_margin: f64) -> f64 {
    STAGE_IMPROVEMENT_RATES
        .iter()
        .map(|(stage, rate)| record.lost_at(*stage) * rate * profit_margin)
        .sum()
}

/// Top-N cohorts by priority score; the table is already sorted.
pub fn get_priority_cohorts(
    impact: &[EconomicImpactRecord],
    top_n: usize,
) -> Vec<EconomicImpactRecord> {
    impact.iter().take(top_n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stage: FunnelStage, loan: f64) -> ApplicantRecord {
        ApplicantRecord {
            applicant_id: "E-1".to_string(),
            credit_score: 700,
            income: 60_000.0,
            age: 30,
            dti_ratio: 0.3,
            loan_amount: loan,
            employment_status: "Employed".to_string(),
            funnel_stage: stage,
            experiment_group: "control".to_string(),
        }
    }

    #[test]
    fn test_lost_revenue_worked_example() {
        // 4 applicants at 10k each: one stalled at Application Started, one at
        // Documents Uploaded, two funded.
        let records = vec![
            record(FunnelStage::ApplicationStarted, 10_000.0),
            record(FunnelStage::DocumentsUploaded, 10_000.0),
            record(FunnelStage::Funded, 10_000.0),
            record(FunnelStage::Funded, 10_000.0),
        ];
        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        assert_eq!(impact.len(), 1);

        let cohort = &impact[0];
        assert_eq!(cohort.total_applications, 4);
        assert_eq!(cohort.lost_revenue_application_started, 500.0);
        assert_eq!(cohort.lost_revenue_documents_uploaded, 500.0);
        assert_eq!(cohort.lost_revenue_underwriting_review, 0.0);
        assert_eq!(cohort.total_lost_revenue, 1_000.0);
        // 20% of losses assumed recoverable
        assert_eq!(cohort.improvement_potential, 200.0);
        // 200 / (4 * 50)
        assert_eq!(cohort.roi_ratio, 1.0);
        // 200 * 4 / 1000
        assert_eq!(cohort.priority_score, 0.8);
    }

    #[test]
    fn test_funded_applicants_are_not_losses() {
        let records = vec![record(FunnelStage::Funded, 25_000.0)];
        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        assert_eq!(impact[0].total_lost_revenue, 0.0);
        assert_eq!(impact[0].priority_score, 0.0);
    }

    #[test]
    fn test_zero_cost_roi_is_zero() {
        let assumptions = EconomicAssumptions {
            cost_per_application: 0.0,
            ..Default::default()
        };
        let records = vec![record(FunnelStage::ApplicationStarted, 10_000.0)];
        let impact = run_economic_impact_analysis(&records, &assumptions);
        assert_eq!(impact[0].roi_ratio, 0.0);
    }

    #[test]
    fn test_sorted_by_priority_descending() {
        let mut records = Vec::new();
        // Big cohort with large losses
        for _ in 0..10 {
            let mut r = record(FunnelStage::ApplicationStarted, 40_000.0);
            r.age = 30;
            records.push(r);
        }
        // Small cohort with small losses
        let mut r = record(FunnelStage::ApplicationStarted, 1_000.0);
        r.age = 60;
        records.push(r);

        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        assert_eq!(impact.len(), 2);
        assert!(impact[0].priority_score >= impact[1].priority_score);
        assert_eq!(impact[0].age_group, "26-35");
    }

    #[test]
    fn test_priority_cohort_selection() {
        let mut records = Vec::new();
        for age in [20, 30, 40, 50] {
            let mut r = record(FunnelStage::ApplicationStarted, 10_000.0);
            r.age = age;
            records.push(r);
        }
        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        assert_eq!(impact.len(), 4);

        let top = get_priority_cohorts(&impact, 2);
        assert_eq!(top.len(), 2);

        // Asking for more than exist returns what exists, not an error
        let all = get_priority_cohorts(&impact, 10);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_conversion_improvement_value() {
        let records = vec![
            record(FunnelStage::ApplicationStarted, 10_000.0),
            record(FunnelStage::Approved, 20_000.0),
        ];
        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        // 10000 * 0.10 * 0.05 + 20000 * 0.25 * 0.05 = 50 + 250
        assert!((impact[0].conversion_improvement_value - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_cohort_label() {
        let records = vec![record(FunnelStage::ApplicationStarted, 10_000.0)];
        let impact = run_economic_impact_analysis(&records, &EconomicAssumptions::default());
        assert_eq!(impact[0].cohort_label(), "26-35 | Low DTI | Good (670-739)");
    }
}
