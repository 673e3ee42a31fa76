//! Report rendering for the terminal

use console::{style, StyledObject};
use repomirror_engine::RunOutcome;
use repomirror_types::{Error, Report, ReportItem, ReportStatus};

const NAME_WIDTH: usize = 30;
const STATUS_WIDTH: usize = 20;
const COMMENT_WIDTH: usize = 70;

/// Print the run summary and, when there is one, the report table
pub fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Skipped => {
            println!(
                "{} Already synchronized today, nothing to do",
                style("ℹ").cyan().bold()
            );
        }
        RunOutcome::Aborted { report } => {
            println!("{} Run stopped by the operator", style("✗").red().bold());
            print_report(report);
        }
        RunOutcome::Completed {
            synchronized: true,
            report,
        } => {
            println!(
                "{} Sync complete, repositories are in sync",
                style("✓").green().bold()
            );
            print_report(report);
        }
        RunOutcome::Completed {
            synchronized: false,
            report,
        } => {
            println!(
                "{} Errors found, repositories are not in sync",
                style("✗").red().bold()
            );
            print_report(report);
        }
    }
}

/// Print an error that ended the run
pub fn print_error(error: &Error) {
    eprintln!("{} {}", style("Error:").red().bold(), error);
}

/// Print the report as a name / status / comment table
pub fn print_report(report: &Report) {
    if report.is_empty() {
        return;
    }
    println!();
    println!("{}", style(header()).bold().underlined());
    for item in report.iter() {
        println!("{}", render_row(item));
    }
}

fn header() -> String {
    format!(
        "{:<name$} {:<status$} {:<comment$}",
        "Name",
        "Status",
        "Comment",
        name = NAME_WIDTH,
        status = STATUS_WIDTH,
        comment = COMMENT_WIDTH
    )
}

fn render_row(item: &ReportItem) -> String {
    let status = format!("{:<width$}", item.status, width = STATUS_WIDTH);
    format!(
        "{:<width$} {} {}",
        item.name,
        status_style(item.status, status),
        item.comment,
        width = NAME_WIDTH
    )
}

fn status_style(status: ReportStatus, text: String) -> StyledObject<String> {
    match status {
        ReportStatus::Info => style(text).green(),
        ReportStatus::ImportantInfo => style(text).green().bold(),
        ReportStatus::Warning => style(text).yellow(),
        ReportStatus::Error => style(text).red(),
        ReportStatus::Fatal => style(text).red().bold(),
    }
}
