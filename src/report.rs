//! Console reports.
//!
//! Tables for generated and decoded scripts. Output goes straight to stdout;
//! diagnostics belong in `tracing`, not here.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

use crate::presets::{BatchReport, LoadOutcome, LoadedScript};
use crate::profile::ProfileRegistry;
use crate::stats::{self, PhaseStats};
use crate::types::ParsedRecord;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn fmt_avg(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Render per-phase statistics as a table.
pub fn phase_stats_table(stats: &[PhaseStats]) -> Table {
    let mut table = new_table(vec![
        "Phase",
        "Avg bandwidth (Mbps)",
        "Avg delay (ms)",
        "Avg loss (‰)",
        "Segments",
    ]);

    for s in stats {
        table.add_row(vec![
            Cell::new(format!("#{}", s.phase)),
            Cell::new(fmt_avg(s.avg_bandwidth)).set_alignment(CellAlignment::Right),
            Cell::new(fmt_avg(s.avg_delay)).set_alignment(CellAlignment::Right),
            Cell::new(fmt_avg(s.avg_loss)).set_alignment(CellAlignment::Right),
            Cell::new(s.count).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Print the statistics block of one scenario.
pub fn print_phase_stats(scenario: &str, stats: &[PhaseStats]) {
    println!();
    println!("{} {}", "▶".bright_green(), format!("{scenario} statistics").bright_white().bold());
    println!("{}", phase_stats_table(stats));
}

/// Print the registry envelopes.
pub fn print_levels(registry: &ProfileRegistry) {
    let mut table = new_table(vec![
        "Level",
        "Name",
        "Bandwidth (Mbps)",
        "Delay (ms)",
        "Loss (‰)",
        "Fluctuation",
    ]);

    for profile in registry.iter() {
        table.add_row(vec![
            profile.level.to_string(),
            profile.name.clone(),
            profile.bandwidth_range.to_string(),
            profile.delay_range.to_string(),
            profile.loss_range.to_string(),
            format!("±{:.0}%", profile.fluctuation * 100.0),
        ]);
    }

    println!("{table}");
}

/// Min/mean/max of one metric.
fn spread(values: impl Iterator<Item = i64> + Clone) -> String {
    let count = values.clone().count();
    if count == 0 {
        return "-".to_string();
    }
    let min = values.clone().min().unwrap_or_default();
    let max = values.clone().max().unwrap_or_default();
    let mean = values.map(i128::from).sum::<i128>() as f64 / count as f64;
    format!("{min} / {mean:.1} / {max}")
}

/// Print a one-row overview (segment count, time span, metric spreads)
/// of a decoded script.
pub fn print_script_overview(scenario: &str, records: &[ParsedRecord]) {
    let mut table = new_table(vec![
        "Scenario",
        "Records",
        "Span (s)",
        "Bandwidth min/mean/max",
        "Delay min/mean/max",
        "Loss min/mean/max",
    ]);

    let span = match (records.first(), records.last()) {
        (Some(first), Some(last)) => format!(
            "{:.0} - {:.0}",
            first.start_ms as f64 / 1000.0,
            last.start_ms.saturating_add(last.duration_ms) as f64 / 1000.0
        ),
        _ => "-".to_string(),
    };

    table.add_row(vec![
        scenario.to_string(),
        records.len().to_string(),
        span,
        spread(records.iter().map(|r| r.bandwidth)),
        spread(records.iter().map(|r| r.delay)),
        spread(records.iter().map(|r| r.loss)),
    ]);

    println!("{table}");
}

/// Print bucket averages of every loaded script and flag the ones that
/// could not be loaded.
pub fn print_loaded_scripts(scripts: &[LoadedScript]) {
    for script in scripts {
        match script.outcome {
            LoadOutcome::Loaded(ref records) => {
                print_phase_stats(&script.name, &stats::summarize_buckets(records));
            }
            LoadOutcome::Missing => {
                println!();
                println!(
                    "{} {} ({})",
                    "⚠".yellow(),
                    format!("{} not found", script.name).yellow(),
                    script.path.display()
                );
            }
            LoadOutcome::Failed(ref e) => {
                println!();
                println!("{} {}: {}", "✗".red(), script.name.red(), e);
            }
        }
    }
}

/// Print the file list of a batch generation run.
pub fn print_batch_summary(report: &BatchReport) {
    println!();
    println!("{}", "═".repeat(60).bright_blue());
    for script in &report.generated {
        println!(
            "  {} {} ({} segments)",
            "✓".green(),
            script.path.display().to_string().bright_cyan(),
            script.timeline.len()
        );
    }
    for (name, err) in &report.failed {
        println!("  {} {}: {}", "✗".red(), name, err);
    }
    println!("{}", "═".repeat(60).bright_blue());
}
