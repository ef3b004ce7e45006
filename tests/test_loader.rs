//! Tests for dataset loading and validation

mod common;

use funnelrisk::pipeline::{load_dataset, records_from_dataframe};

#[test]
fn test_csv_round_trip() {
    let records = common::mixed_dataset(30);
    let mut df = common::records_to_dataframe(&records);
    let (_dir, path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 10_000).unwrap().collect().unwrap();
    let parsed = records_from_dataframe(&loaded).unwrap();

    assert_eq!(parsed.len(), records.len());
    for (a, b) in parsed.iter().zip(records.iter()) {
        assert_eq!(a.applicant_id, b.applicant_id);
        assert_eq!(a.funnel_stage, b.funnel_stage);
        assert_eq!(a.credit_score, b.credit_score);
    }
}

#[test]
fn test_parquet_round_trip() {
    let records = common::mixed_dataset(30);
    let mut df = common::records_to_dataframe(&records);
    let (_dir, path) = common::create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, 10_000).unwrap().collect().unwrap();
    let parsed = records_from_dataframe(&loaded).unwrap();

    assert_eq!(parsed.len(), records.len());
}

#[test]
fn test_missing_file_fails() {
    // Scanning is lazy, so the failure may surface at scan or at collect.
    let result = load_dataset(std::path::Path::new("/nonexistent/applicants.csv"), 100)
        .and_then(|lf| lf.collect().map_err(anyhow::Error::from));
    assert!(result.is_err());
}

#[test]
fn test_unsupported_format_fails() {
    let err = load_dataset(std::path::Path::new("applicants.json"), 100)
        .err()
        .unwrap();
    assert!(err.to_string().contains("Unsupported file format"));
}
