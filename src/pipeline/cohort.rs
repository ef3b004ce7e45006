//! Cohort segmentation
//!
//! Buckets applicants into fixed categorical bands and aggregates risk and
//! funnel metrics per band combination. Banding rules are small ordered tables
//! of (lower bound, label) pairs consulted by linear scan; lower bounds are
//! inclusive. Bands are fixed business definitions, not learned.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use super::analysis::ScoredApplicant;
use super::record::ApplicantRecord;

/// Age bands, youngest first. Lower bounds are inclusive.
const AGE_BANDS: [(i64, &str); 6] = [
    (18, "18-25"),
    (26, "26-35"),
    (36, "36-45"),
    (46, "46-55"),
    (56, "56-65"),
    (66, "65+"),
];

/// Credit score bands following the conventional FICO ranges.
const CREDIT_BANDS: [(i64, &str); 5] = [
    (i64::MIN, "Poor (<580)"),
    (580, "Fair (580-669)"),
    (670, "Good (670-739)"),
    (740, "Very Good (740-799)"),
    (800, "Excellent (800+)"),
];

const INCOME_BANDS: [(f64, &str); 3] = [
    (f64::NEG_INFINITY, "Low (<40k)"),
    (40_000.0, "Mid (40k-80k)"),
    (80_000.1, "High (80k+)"),
];

const LOAN_AMOUNT_BANDS: [(f64, &str); 6] = [
    (f64::NEG_INFINITY, "Very Small Loan"),
    (5_000.0, "Small Loan"),
    (10_000.1, "Medium Loan"),
    (15_000.1, "Large Loan"),
    (25_000.1, "Very Large Loan"),
    (35_000.1, "High-End Loan"),
];

/// Look up the band label for a value in an ordered (lower bound, label)
/// table. Scans from the highest band down; the first bound at or below the
/// value wins.
fn band_label<T: PartialOrd + Copy>(value: T, bands: &[(T, &'static str)]) -> &'static str {
    for (lower, label) in bands.iter().rev() {
        if value >= *lower {
            return label;
        }
    }
    // Below every lower bound; the first band absorbs it
    bands[0].1
}

pub fn age_group(age: i64) -> &'static str {
    band_label(age, &AGE_BANDS)
}

pub fn dti_group(dti: f64) -> &'static str {
    if dti > 0.50 {
        "High DTI"
    } else if dti >= 0.36 {
        "Medium DTI"
    } else {
        "Low DTI"
    }
}

pub fn credit_group(score: i64) -> &'static str {
    band_label(score, &CREDIT_BANDS)
}

pub fn income_band(income: f64) -> &'static str {
    band_label(income, &INCOME_BANDS)
}

pub fn loan_amount_group(amount: f64) -> &'static str {
    band_label(amount, &LOAN_AMOUNT_BANDS)
}

/// Normalize an employment status label case-insensitively to the three known
/// categories. Unknown values pass through unchanged; non-classification is
/// explicit, not an error.
pub fn normalize_employment(status: &str) -> String {
    match status.trim().to_lowercase().as_str() {
        "employed" => "Employed".to_string(),
        "unemployed" => "Unemployed".to_string(),
        "self-employed" | "self employed" => "Self-Employed".to_string(),
        _ => status.to_string(),
    }
}

/// The full six-band grouping key for a cohort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CohortKey {
    pub age_group: &'static str,
    pub dti_group: &'static str,
    pub credit_group: &'static str,
    pub income_band: &'static str,
    pub loan_amount_group: &'static str,
    pub employment_status: String,
}

impl CohortKey {
    pub fn from_record(record: &ApplicantRecord) -> Self {
        Self {
            age_group: age_group(record.age),
            dti_group: dti_group(record.dti_ratio),
            credit_group: credit_group(record.credit_score),
            income_band: income_band(record.income),
            loan_amount_group: loan_amount_group(record.loan_amount),
            employment_status: normalize_employment(&record.employment_status),
        }
    }

    /// Readable pipe-joined label for display.
    pub fn label(&self) -> String {
        format!(
            "{} | {} | {} | {} | {} | {}",
            self.age_group,
            self.dti_group,
            self.credit_group,
            self.income_band,
            self.loan_amount_group,
            self.employment_status
        )
    }
}

/// Aggregated metrics for one cohort. Rates are in [0, 1], rounded to three
/// decimals; cohorts with zero members are never emitted.
#[derive(Debug, Clone, Serialize)]
pub struct CohortMetrics {
    #[serde(flatten)]
    pub key: CohortKey,
    pub applicant_count: usize,
    pub mean_abandonment_risk: f64,
    pub completed_app_rate: f64,
    pub uploaded_docs_rate: f64,
    pub passed_underwriting_rate: f64,
    pub funded_rate: f64,
}

/// Group scored applicants by the six-band key and aggregate per cohort.
///
/// Aggregations across distinct keys are independent, so they run in parallel.
/// Output is sorted by key for deterministic, idempotent results.
pub fn segment_cohorts(scored: &[ScoredApplicant]) -> Vec<CohortMetrics> {
    let mut groups: HashMap<CohortKey, Vec<&ScoredApplicant>> = HashMap::new();
    for s in scored {
        groups.entry(CohortKey::from_record(&s.record)).or_default().push(s);
    }

    let mut metrics: Vec<CohortMetrics> = groups
        .into_par_iter()
        .map(|(key, members)| aggregate_cohort(key, &members))
        .collect();

    metrics.sort_by(|a, b| a.key.cmp(&b.key));
    metrics
}

fn aggregate_cohort(key: CohortKey, members: &[&ScoredApplicant]) -> CohortMetrics {
    let n = members.len() as f64;
    let mean = |f: &dyn Fn(&ScoredApplicant) -> f64| -> f64 {
        round3(members.iter().map(|m| f(m)).sum::<f64>() / n)
    };

    CohortMetrics {
        applicant_count: members.len(),
        mean_abandonment_risk: mean(&|m| m.abandonment_risk),
        completed_app_rate: mean(&|m| m.indicators.completed_app as i32 as f64),
        uploaded_docs_rate: mean(&|m| m.indicators.uploaded_docs as i32 as f64),
        passed_underwriting_rate: mean(&|m| m.indicators.passed_underwriting as i32 as f64),
        funded_rate: mean(&|m| m.indicators.funded as i32 as f64),
        key,
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

// ============================================================================
// Two-way interaction view
// ============================================================================

/// One banding dimension usable in a two-way interaction view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BandDimension {
    AgeGroup,
    DtiGroup,
    CreditGroup,
    IncomeBand,
    LoanAmountGroup,
    EmploymentStatus,
}

impl BandDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandDimension::AgeGroup => "age_group",
            BandDimension::DtiGroup => "dti_group",
            BandDimension::CreditGroup => "credit_group",
            BandDimension::IncomeBand => "income_band",
            BandDimension::LoanAmountGroup => "loan_amount_group",
            BandDimension::EmploymentStatus => "employment_status",
        }
    }

    fn level(&self, record: &ApplicantRecord) -> String {
        match self {
            BandDimension::AgeGroup => age_group(record.age).to_string(),
            BandDimension::DtiGroup => dti_group(record.dti_ratio).to_string(),
            BandDimension::CreditGroup => credit_group(record.credit_score).to_string(),
            BandDimension::IncomeBand => income_band(record.income).to_string(),
            BandDimension::LoanAmountGroup => loan_amount_group(record.loan_amount).to_string(),
            BandDimension::EmploymentStatus => normalize_employment(&record.employment_status),
        }
    }
}

impl std::fmt::Display for BandDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BandDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "age" | "age_group" => Ok(BandDimension::AgeGroup),
            "dti" | "dti_group" => Ok(BandDimension::DtiGroup),
            "credit" | "credit_group" => Ok(BandDimension::CreditGroup),
            "income" | "income_band" => Ok(BandDimension::IncomeBand),
            "loan" | "loan_amount_group" => Ok(BandDimension::LoanAmountGroup),
            "employment" | "employment_status" => Ok(BandDimension::EmploymentStatus),
            _ => Err(format!(
                "Unknown banding dimension: '{}'. Use one of age, dti, credit, \
                 income, loan, employment.",
                s
            )),
        }
    }
}

/// One cell of a two-way interaction table.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionCell {
    pub level1: String,
    pub level2: String,
    pub applicant_count: usize,
    pub mean_abandonment_risk: f64,
    pub funded_rate: f64,
}

/// Mean abandonment risk and funding rate for every observed combination of
/// two banding dimensions, sorted by risk descending.
pub fn interaction_view(
    scored: &[ScoredApplicant],
    dim1: BandDimension,
    dim2: BandDimension,
) -> Vec<InteractionCell> {
    let mut groups: HashMap<(String, String), Vec<&ScoredApplicant>> = HashMap::new();
    for s in scored {
        let key = (dim1.level(&s.record), dim2.level(&s.record));
        groups.entry(key).or_default().push(s);
    }

    let mut cells: Vec<InteractionCell> = groups
        .into_iter()
        .map(|((level1, level2), members)| {
            let n = members.len() as f64;
            InteractionCell {
                level1,
                level2,
                applicant_count: members.len(),
                mean_abandonment_risk: round3(
                    members.iter().map(|m| m.abandonment_risk).sum::<f64>() / n,
                ),
                funded_rate: round3(
                    members.iter().map(|m| m.indicators.funded as i32 as f64).sum::<f64>() / n,
                ),
            }
        })
        .collect();

    cells.sort_by(|a, b| {
        b.mean_abandonment_risk
            .partial_cmp(&a.mean_abandonment_risk)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.level1.as_str(), a.level2.as_str()).cmp(&(b.level1.as_str(), b.level2.as_str())))
    });
    cells
}
