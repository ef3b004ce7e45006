//! Console summaries of the funnel analysis

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::analysis::StageCount;
use crate::pipeline::cohort::{CohortMetrics, InteractionCell};
use crate::pipeline::economic::EconomicImpactRecord;

use super::importance::FeatureImportance;

fn risk_color(risk: f64) -> Color {
    if risk > 0.7 {
        Color::Red
    } else if risk > 0.4 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Per-stage applicant counts, in funnel order.
pub fn display_dropoff_summary(stage_counts: &[StageCount]) {
    print_section("🕳️", "FUNNEL DROP-OFF");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Applicants").add_attribute(Attribute::Bold),
        Cell::new("Share").add_attribute(Attribute::Bold),
    ]);

    for entry in stage_counts {
        table.add_row(vec![
            Cell::new(entry.stage),
            Cell::new(entry.count),
            Cell::new(format!("{:.1}%", entry.share * 100.0)),
        ]);
    }

    print_indented(&table);
}

/// Highest-risk cohorts, largest mean abandonment risk first.
pub fn display_cohort_summary(cohorts: &[CohortMetrics], limit: usize) {
    print_section("👥", "HIGHEST-RISK COHORTS");

    let mut ranked: Vec<&CohortMetrics> = cohorts.iter().collect();
    ranked.sort_by(|a, b| {
        b.mean_abandonment_risk
            .partial_cmp(&a.mean_abandonment_risk)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Cohort").add_attribute(Attribute::Bold),
        Cell::new("Applicants").add_attribute(Attribute::Bold),
        Cell::new("Mean Risk").add_attribute(Attribute::Bold),
        Cell::new("Completion").add_attribute(Attribute::Bold),
        Cell::new("Funding").add_attribute(Attribute::Bold),
    ]);

    for cohort in ranked.iter().take(limit) {
        table.add_row(vec![
            Cell::new(cohort.key.label()),
            Cell::new(cohort.applicant_count),
            Cell::new(format!("{:.3}", cohort.mean_abandonment_risk))
                .fg(risk_color(cohort.mean_abandonment_risk)),
            Cell::new(format!("{:.1}%", cohort.completed_app_rate * 100.0)),
            Cell::new(format!("{:.1}%", cohort.funded_rate * 100.0)),
        ]);
    }

    print_indented(&table);

    if cohorts.len() > limit {
        println!(
            "      {} {}",
            style("•").dim(),
            style(format!("{} more cohorts in the JSON report", cohorts.len() - limit)).dim()
        );
    }
}

/// Economic priorities, highest priority score first.
pub fn display_economic_priorities(priorities: &[EconomicImpactRecord]) {
    print_section("💰", "ECONOMIC PRIORITIES");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Cohort").add_attribute(Attribute::Bold),
        Cell::new("Applicants").add_attribute(Attribute::Bold),
        Cell::new("Lost Revenue").add_attribute(Attribute::Bold),
        Cell::new("Improvement").add_attribute(Attribute::Bold),
        Cell::new("ROI").add_attribute(Attribute::Bold),
        Cell::new("Priority").add_attribute(Attribute::Bold),
    ]);

    for record in priorities {
        table.add_row(vec![
            Cell::new(record.cohort_label()),
            Cell::new(record.total_applications),
            Cell::new(format!("{:.0}", record.total_lost_revenue)).fg(Color::Red),
            Cell::new(format!("{:.0}", record.improvement_potential)).fg(Color::Green),
            Cell::new(format!("{:.2}", record.roi_ratio)),
            Cell::new(format!("{:.2}", record.priority_score)).add_attribute(Attribute::Bold),
        ]);
    }

    print_indented(&table);
}

/// Standardized coefficient magnitudes per transition.
pub fn display_feature_importance(importance: &[FeatureImportance]) {
    print_section("📈", "FEATURE IMPORTANCE");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Transition").add_attribute(Attribute::Bold),
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("|Coefficient|").add_attribute(Attribute::Bold),
    ]);

    let mut previous: Option<&str> = None;
    for entry in importance {
        let transition = if previous == Some(entry.transition) {
            String::new()
        } else {
            entry.transition.to_string()
        };
        previous = Some(entry.transition);

        table.add_row(vec![
            Cell::new(transition),
            Cell::new(entry.feature),
            Cell::new(format!("{:.4}", entry.importance)),
        ]);
    }

    print_indented(&table);
}

/// Two-way interaction view, riskiest cells first.
pub fn display_interaction_view(cells: &[InteractionCell], limit: usize) {
    print_section("🔀", "DIMENSION INTERACTIONS");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Level A").add_attribute(Attribute::Bold),
        Cell::new("Level B").add_attribute(Attribute::Bold),
        Cell::new("Applicants").add_attribute(Attribute::Bold),
        Cell::new("Mean Risk").add_attribute(Attribute::Bold),
    ]);

    for cell in cells.iter().take(limit) {
        table.add_row(vec![
            Cell::new(&cell.level1),
            Cell::new(&cell.level2),
            Cell::new(cell.applicant_count),
            Cell::new(format!("{:.3}", cell.mean_abandonment_risk))
                .fg(risk_color(cell.mean_abandonment_risk)),
        ]);
    }

    print_indented(&table);
}

/// Warn about transitions whose model could not be trained.
pub fn display_fallback_warnings(fallbacks: &[String]) {
    if fallbacks.is_empty() {
        return;
    }
    println!();
    for fallback in fallbacks {
        println!(
            "    {} {}",
            style("⚠️").yellow(),
            style(format!("Model skipped for {}", fallback)).yellow()
        );
    }
}
