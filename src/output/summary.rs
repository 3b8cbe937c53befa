use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDate;
use comfy_table::Cell;

use crate::schedule::{PlannedSession, ScheduleFilter};
use crate::sync::SyncReport;

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{
    color_coded_status_cell, create_cyan_header, create_table, eligibility_cell, status_detail,
};

/// Prints the outcome of a sync run to stdout.
///
/// One row per session, followed by counters. Failed sessions keep their error
/// message so they can be retried by hand.
pub fn print_report(report: &SyncReport, output_dir: &Path) {
    println!("{}", render_report(report, output_dir));
}

/// Prints the planned sessions with their local date and eligibility.
pub fn print_plan(sessions: &[PlannedSession], filter: &ScheduleFilter, today: NaiveDate) {
    println!("{}", render_plan(sessions, filter, today));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_report(report: &SyncReport, output_dir: &Path) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Artifacts:"),
        cyan(output_dir.display()),
        dim("Uploaded:"),
        bright_green(report.uploaded()),
        dim("Written only:"),
        bright_yellow(report.written()),
        dim("Skipped:"),
        dim(report.skipped()),
        dim("Failed:"),
        if report.failed() > 0 {
            bright_red(report.failed())
        } else {
            bright_green(report.failed())
        },
    );

    if report.outcomes.is_empty() {
        let _ = writeln!(output, "  {}", dim("No planned sessions in range."));
        return output;
    }

    add_section_header(&mut output, "🗓️", "Sessions");
    let mut table = create_table();
    table.set_header(create_cyan_header(&["Date", "Workout", "Status", "Details"]));

    for outcome in &report.outcomes {
        table.add_row(vec![
            Cell::new(format_date(outcome.date)),
            Cell::new(&outcome.name),
            color_coded_status_cell(&outcome.status),
            Cell::new(status_detail(&outcome.status)),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn render_plan(sessions: &[PlannedSession], filter: &ScheduleFilter, today: NaiveDate) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🗓️", "Planned sessions");

    if sessions.is_empty() {
        let _ = writeln!(output, "  {}", dim("No planned sessions in range."));
        return output;
    }

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Date", "Workout", "Sport", "Upload"]));

    for session in sessions {
        table.add_row(vec![
            Cell::new(format_date(session.local_date())),
            Cell::new(&session.display_name),
            Cell::new(session.sport),
            eligibility_cell(filter.is_eligible(session, today)),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}
