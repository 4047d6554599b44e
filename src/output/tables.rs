use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::workflow::JobStatus;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_status_cell(status: &JobStatus) -> Cell {
    let text = match status {
        JobStatus::Skipped { reason } => format!("skipped ({})", reason.describe()),
        other => other.label().to_string(),
    };
    match status {
        JobStatus::Succeeded => Cell::new(text).fg(TableColor::Green),
        JobStatus::Failed { .. } => Cell::new(text).fg(TableColor::Red),
        JobStatus::Cancelled => Cell::new(text).fg(TableColor::Yellow),
        JobStatus::Skipped { .. } => Cell::new(text).fg(TableColor::DarkGrey),
    }
}

pub fn yes_no_cell(value: Option<bool>) -> Cell {
    match value {
        Some(true) => Cell::new("yes").fg(TableColor::Yellow),
        Some(false) => Cell::new("no"),
        None => Cell::new("-"),
    }
}
