//! Funnelrisk: Loan Funnel Abandonment-Risk Library
//!
//! A library for analyzing loan-application funnels using
//! stage-cascaded survival models, cohort segmentation, and economic impact scoring.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
