use std::fmt::Write;

use comfy_table::Cell;

use crate::workflow::{InvocationReport, JobOutcome, JobStatus};

use super::styling::{bright, bright_red, bright_yellow, cyan, dim, verdict};
use super::tables::{color_coded_status_cell, create_table, cyan_header, yes_no_cell};

/// Prints a human-readable summary of an invocation to stderr.
///
/// Stdout stays reserved for the JSON report so it can be piped.
pub fn print_summary(report: &InvocationReport) {
    eprintln!("{}", render_summary(report));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn format_duration(job: &JobOutcome) -> String {
    job.duration_secs()
        .map_or_else(|| "-".to_string(), |secs| format!("{secs:.1}s"))
}

fn render_summary(report: &InvocationReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Invocation");

    let labels = if report.context.labels.is_empty() {
        "none".to_string()
    } else {
        report.context.labels.iter().collect::<Vec<_>>().join(", ")
    };

    let _ = write!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n\n",
        dim("Ref:"),
        cyan(&report.context.ref_id),
        dim("Event:"),
        bright_yellow(&report.context.event),
        dim("Labels:"),
        dim(labels),
        dim("Concurrency group:"),
        cyan(&report.concurrency_group),
        dim("Result:"),
        verdict(report),
    );

    add_section_header(&mut output, "🚦", "Dispatches");

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Pipeline Mode",
        "Status",
        "Branch",
        "Lightened",
        "Duration",
    ]));

    for job in &report.jobs {
        let request = job.request.as_ref();
        table.add_row(vec![
            Cell::new(job.mode.as_str()),
            color_coded_status_cell(&job.status),
            Cell::new(request.map_or("-", |r| r.branch.as_str())),
            yes_no_cell(request.map(|r| r.run_lightened_ci)),
            Cell::new(format_duration(job)),
        ]);
    }

    let _ = writeln!(output, "{table}");

    for job in &report.jobs {
        if let JobStatus::Failed { reason } = &job.status {
            let _ = writeln!(output, "  {} {}: {}", bright_red("✗"), job.mode, reason);
        }
    }

    output
}
