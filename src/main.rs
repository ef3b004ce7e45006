//! Funnelrisk: Loan Funnel Abandonment-Risk CLI Tool
//!
//! A command-line tool for analyzing where loan applicants abandon the
//! application funnel and what that abandonment costs.

mod cli;
mod pipeline;
mod report;
mod utils;

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use cli::Cli;
use pipeline::{
    dropoff_summary, get_priority_cohorts, load_dataset, records_from_dataframe,
    run_analysis, run_economic_impact_analysis, AnalysisConfig, BandDimension,
    EconomicAssumptions, FitConfig, RiskPolicy,
};
use report::{
    display_cohort_summary, display_dropoff_summary, display_economic_priorities,
    display_fallback_warnings, display_feature_importance, display_interaction_view,
    export_funnel_report, top_feature_per_transition, ExportParams,
};
use utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let policy: RiskPolicy = cli
        .policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let interaction = match cli.interaction_dimensions() {
        Some((a, b)) => {
            let dim1: BandDimension = a.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let dim2: BandDimension = b.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            Some((dim1, dim2))
        }
        None => {
            if cli.interaction.is_some() {
                anyhow::bail!(
                    "--interaction expects two comma-separated dimensions, e.g. 'credit,dti'"
                );
            }
            None
        }
    };

    let output_path = cli.output_path();
    let assumptions = EconomicAssumptions {
        profit_margin: cli.profit_margin,
        improvement_factor: cli.improvement_factor,
        cost_per_application: cli.cost_per_application,
    };

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(
        &cli.input,
        &output_path,
        &policy.to_string(),
        cli.profit_margin,
        cli.cost_per_application,
    );

    // Step 1: Load and validate dataset
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let lf = load_dataset(&cli.input, cli.infer_schema_length)?;
    let df = lf.collect()?;
    let records = records_from_dataframe(&df)?;
    finish_with_success(&spinner, "Dataset loaded");

    if records.is_empty() {
        anyhow::bail!("Dataset contains no applicants");
    }

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Applicants: {}", records.len());
    println!(
        "      Estimated memory: {:.2} MB",
        df.estimated_size() as f64 / (1024.0 * 1024.0)
    );

    let stage_counts = dropoff_summary(&records);
    display_dropoff_summary(&stage_counts);
    print_step_time(step_start.elapsed());

    // Step 2: Train transition models and score applicants
    print_step_header(2, "Abandonment Risk Scoring");

    let step_start = Instant::now();
    let spinner = create_spinner("Training transition models...");
    let config = AnalysisConfig {
        policy,
        fit: FitConfig {
            max_iterations: cli.max_iterations,
            tolerance: cli.tolerance,
            ..FitConfig::default()
        },
    };
    let analysis = run_analysis(&records, &config);
    finish_with_success(&spinner, "Applicants scored");

    display_fallback_warnings(&analysis.fallback_transitions);
    print_count("cohort(s)", analysis.cohorts.len(), None);

    display_cohort_summary(&analysis.cohorts, cli.cohort_display_limit);
    display_feature_importance(&analysis.feature_importance);
    for entry in top_feature_per_transition(&analysis.feature_importance) {
        print_info(&format!(
            "Strongest driver for {}: {}",
            entry.transition, entry.feature
        ));
    }

    if let Some((dim1, dim2)) = interaction {
        print_info(&format!("Interaction view: {} x {}", dim1, dim2));
        let cells = pipeline::interaction_view(&analysis.applicants, dim1, dim2);
        display_interaction_view(&cells, cli.cohort_display_limit);
    }
    print_step_time(step_start.elapsed());

    // Step 3: Economic impact
    print_step_header(3, "Economic Impact");

    let step_start = Instant::now();
    let spinner = create_spinner("Scoring cohort economics...");
    let impact = run_economic_impact_analysis(&records, &assumptions);
    finish_with_success(&spinner, "Economic impact computed");

    let priorities = get_priority_cohorts(&impact, cli.top_n);
    display_economic_priorities(&priorities);
    print_step_time(step_start.elapsed());

    // Step 4: Export report
    print_step_header(4, "Save Report");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing JSON report...");
    export_funnel_report(
        &analysis,
        &impact,
        stage_counts,
        &output_path,
        &ExportParams {
            input_file: &cli.input.display().to_string(),
            policy,
            assumptions,
        },
    )?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    print_step_time(step_start.elapsed());

    // Final completion message
    print_completion();

    Ok(())
}
