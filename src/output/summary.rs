use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::report::MigrationReport;

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{create_table, failure_count_cell, skipped_count_cell, success_count_cell};

/// Prints a human-readable summary of a migration run to stdout.
///
/// Displays:
/// - Overview: project, source count, extracted tests, extraction status
/// - Results: created, skipped and failed counts per object type
/// - Next Steps: where to look when something failed
///
/// Color coding:
/// - Green: created objects, zero failures
/// - Yellow: intentionally skipped objects (duplicates, tests without steps, unresolved runs)
/// - Red: failures that were written to the error log
pub fn print_summary(report: &MigrationReport) {
    println!("{}", render_summary(report));
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_summary(report: &MigrationReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let extraction_status = if report.extraction_aborted {
        bright_red("aborted early")
    } else {
        bright_green("complete")
    };

    let _ = writeln!(
        output,
        "  {} {} {}\n  {} {}\n  {} {} ({})\n  {} {}\n",
        dim("Project:"),
        cyan(&report.project),
        dim(format!("→ {}", report.project_key)),
        dim("Source tests:"),
        bright_yellow(report.source_total),
        dim("Extracted:"),
        bright_yellow(report.extracted),
        extraction_status,
        dim("Duration:"),
        bright_yellow(format!(
            "{}s",
            (report.finished_at - report.started_at).num_seconds()
        )),
    );

    add_section_header(&mut output, "📦", "Results");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Object", "Created", "Skipped", "Failed"]));
    table.add_row(vec![
        Cell::new("Test cases"),
        success_count_cell(report.test_cases.created),
        skipped_count_cell(report.test_cases.duplicates),
        failure_count_cell(report.test_cases.failed),
    ]);
    table.add_row(vec![
        Cell::new("Test steps"),
        success_count_cell(report.steps.pushed),
        skipped_count_cell(report.steps.without_steps),
        failure_count_cell(report.steps.failed),
    ]);
    table.add_row(vec![
        Cell::new("Test cycles"),
        success_count_cell(report.executions.cycles_created),
        skipped_count_cell(0),
        failure_count_cell(report.executions.cycles_failed),
    ]);
    table.add_row(vec![
        Cell::new("Executions"),
        success_count_cell(report.executions.created),
        skipped_count_cell(report.executions.unresolved),
        failure_count_cell(report.executions.failed),
    ]);
    let _ = writeln!(output, "{table}\n");

    add_section_header(&mut output, "💡", "Next Steps");

    if report.failures() == 0 && report.error_log_entries == 0 {
        let _ = writeln!(
            output,
            "  {}",
            bright_green("Migration finished without errors.")
        );
    } else {
        let _ = writeln!(
            output,
            "  {} {} {}",
            bright_red(format!("{} failures recorded.", report.failures())),
            dim("Review"),
            cyan(&report.error_log),
        );
        if report.executions.plans_query_failed {
            let _ = writeln!(
                output,
                "  {}",
                dim("Test plans could not be read; no test cycles were created.")
            );
        }
    }

    if report.executions.unresolved > 0 {
        let _ = writeln!(
            output,
            "  {}",
            dim(format!(
                "{} runs referenced tests that were not migrated and were skipped.",
                report.executions.unresolved
            ))
        );
    }

    output
}
