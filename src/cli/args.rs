//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Funnelrisk - Analyze loan-application funnel abandonment risk
#[derive(Parser, Debug)]
#[command(name = "funnelrisk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON report path.
    /// Defaults to the input directory with a '_funnel_report.json' suffix
    /// (e.g., applicants.csv -> applicants_funnel_report.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Risk composition policy.
    /// Options: "cascade" (model-driven, default) or "heuristic" (rule-based)
    #[arg(long, default_value = "cascade")]
    pub policy: String,

    /// Profit margin applied to lost loan volume when estimating lost revenue
    #[arg(long, default_value = "0.05", value_parser = validate_unit_interval)]
    pub profit_margin: f64,

    /// Fraction of lost revenue assumed recoverable by targeted intervention
    #[arg(long, default_value = "0.2", value_parser = validate_unit_interval)]
    pub improvement_factor: f64,

    /// Intervention cost per application, in the dataset's currency
    #[arg(long, default_value = "50.0", value_parser = validate_non_negative)]
    pub cost_per_application: f64,

    /// Number of priority cohorts to display
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Number of cohort rows to display in the console summary
    #[arg(long, default_value = "15")]
    pub cohort_display_limit: usize,

    /// Maximum IRLS iterations per transition model
    #[arg(long, default_value = "100")]
    pub max_iterations: usize,

    /// IRLS convergence tolerance on the coefficient update
    #[arg(long, default_value = "1e-8")]
    pub tolerance: f64,

    /// Show a two-way interaction view for a pair of banding dimensions,
    /// comma-separated (e.g. "credit,dti").
    /// Dimensions: age, dti, credit, income, loan, employment
    #[arg(long)]
    pub interaction: Option<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let parent = self
                .input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_funnel_report.json", stem))
        })
    }

    /// Parse the --interaction flag into its two dimension labels.
    pub fn interaction_dimensions(&self) -> Option<(String, String)> {
        let raw = self.interaction.as_ref()?;
        let (a, b) = raw.split_once(',')?;
        Some((a.trim().to_string(), b.trim().to_string()))
    }
}

/// Validator for ratio parameters that must lie in [0, 1]
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for cost parameters that must be non-negative
fn validate_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < 0.0 {
        Err(format!("value must be non-negative, got {}", value))
    } else {
        Ok(value)
    }
}
