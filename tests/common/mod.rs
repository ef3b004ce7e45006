//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use funnelrisk::pipeline::{ApplicantRecord, FunnelStage};

/// Builder-style constructor for a single applicant with sensible defaults.
pub fn applicant(id: &str, stage: FunnelStage) -> ApplicantRecord {
    ApplicantRecord {
        applicant_id: id.to_string(),
        credit_score: 690,
        income: 55_000.0,
        age: 34,
        dti_ratio: 0.28,
        loan_amount: 14_000.0,
        employment_status: "Employed".to_string(),
        funnel_stage: stage,
        experiment_group: "control".to_string(),
    }
}

/// A deterministic mixed-stage dataset where every transition has both
/// outcomes and overlapping feature ranges, so all four models train.
pub fn mixed_dataset(n: usize) -> Vec<ApplicantRecord> {
    (0..n)
        .map(|i| {
            let stage = FunnelStage::ALL[i % 5];
            let mut r = applicant(&format!("APP-{:04}", i), stage);
            r.credit_score = 500 + ((i * 37) % 320) as i64;
            r.income = 25_000.0 + ((i * 53) % 90) as f64 * 1_000.0;
            r.age = 19 + ((i * 13) % 50) as i64;
            r.dti_ratio = 0.05 + ((i * 7) % 11) as f64 * 0.05;
            r.loan_amount = 3_000.0 + ((i * 29) % 12) as f64 * 4_000.0;
            if i % 7 == 0 {
                r.employment_status = "Unemployed".to_string();
            } else if i % 5 == 0 {
                r.employment_status = "Self-Employed".to_string();
            }
            if i % 2 == 0 {
                r.experiment_group = "treatment".to_string();
            }
            r
        })
        .collect()
}

/// Materialize records as the on-disk dataset schema.
pub fn records_to_dataframe(records: &[ApplicantRecord]) -> DataFrame {
    let ids: Vec<String> = records.iter().map(|r| r.applicant_id.clone()).collect();
    let credit: Vec<i64> = records.iter().map(|r| r.credit_score).collect();
    let income: Vec<f64> = records.iter().map(|r| r.income).collect();
    let age: Vec<i64> = records.iter().map(|r| r.age).collect();
    let dti: Vec<f64> = records.iter().map(|r| r.dti_ratio).collect();
    let loan: Vec<f64> = records.iter().map(|r| r.loan_amount).collect();
    let employment: Vec<String> =
        records.iter().map(|r| r.employment_status.clone()).collect();
    let stage: Vec<&str> = records.iter().map(|r| r.funnel_stage.as_str()).collect();
    let group: Vec<String> = records.iter().map(|r| r.experiment_group.clone()).collect();

    DataFrame::new(vec![
        Column::new("applicant_id".into(), ids),
        Column::new("credit_score".into(), credit),
        Column::new("income".into(), income),
        Column::new("age".into(), age),
        Column::new("dti_ratio".into(), dti),
        Column::new("loan_amount".into(), loan),
        Column::new("employment_status".into(), employment),
        Column::new("funnel_stage".into(), stage),
        Column::new("experiment_group".into(), group),
    ])
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("applicants.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("applicants.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
