//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::record::ApplicantRecord;
use super::stages::FunnelStage;

/// Columns every applicant dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "applicant_id",
    "credit_score",
    "income",
    "age",
    "dti_ratio",
    "loan_amount",
    "employment_status",
    "funnel_stage",
    "experiment_group",
];

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(infer_schema_length))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Materialize a validated applicant dataset from a frame.
///
/// Fails fast on missing columns, null cells, or an unrecognized funnel
/// stage label; a malformed row never silently becomes a default record.
pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<ApplicantRecord>> {
    for col in REQUIRED_COLUMNS {
        if df.column(col).is_err() {
            anyhow::bail!("Dataset is missing required column '{}'", col);
        }
    }

    let ids = df.column("applicant_id")?.str()?;
    let credit_scores = df.column("credit_score")?.cast(&DataType::Int64)?;
    let credit_scores = credit_scores.i64()?;
    let incomes = df.column("income")?.cast(&DataType::Float64)?;
    let incomes = incomes.f64()?;
    let ages = df.column("age")?.cast(&DataType::Int64)?;
    let ages = ages.i64()?;
    let dti_ratios = df.column("dti_ratio")?.cast(&DataType::Float64)?;
    let dti_ratios = dti_ratios.f64()?;
    let loan_amounts = df.column("loan_amount")?.cast(&DataType::Float64)?;
    let loan_amounts = loan_amounts.f64()?;
    let employment = df.column("employment_status")?.str()?;
    let stages = df.column("funnel_stage")?.str()?;
    let groups = df.column("experiment_group")?.str()?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let stage_label = required_cell(stages.get(row), "funnel_stage", row)?;
        let funnel_stage: FunnelStage = stage_label
            .parse()
            .with_context(|| format!("Row {}: invalid funnel stage", row))?;

        records.push(ApplicantRecord {
            applicant_id: required_cell(ids.get(row), "applicant_id", row)?.to_string(),
            credit_score: required_cell(credit_scores.get(row), "credit_score", row)?,
            income: required_cell(incomes.get(row), "income", row)?,
            age: required_cell(ages.get(row), "age", row)?,
            dti_ratio: required_cell(dti_ratios.get(row), "dti_ratio", row)?,
            loan_amount: required_cell(loan_amounts.get(row), "loan_amount", row)?,
            employment_status: required_cell(employment.get(row), "employment_status", row)?
                .to_string(),
            funnel_stage,
            experiment_group: required_cell(groups.get(row), "experiment_group", row)?.to_string(),
        });
    }

    Ok(records)
}

fn required_cell<T>(value: Option<T>, column: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| anyhow::anyhow!("Row {}: null value in column '{}'", row, column))
}
