use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::sync::SessionStatus;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_status_cell(status: &SessionStatus) -> Cell {
    match status {
        SessionStatus::Uploaded(_) => Cell::new("Uploaded").fg(TableColor::Green),
        SessionStatus::Written(_) => Cell::new("Written").fg(TableColor::Cyan),
        SessionStatus::Skipped(_) => Cell::new("Skipped").fg(TableColor::DarkGrey),
        SessionStatus::Failed(_) => Cell::new("Failed").fg(TableColor::Red),
    }
}

pub fn status_detail(status: &SessionStatus) -> String {
    match status {
        SessionStatus::Uploaded(path) | SessionStatus::Written(path) => {
            path.display().to_string()
        }
        SessionStatus::Skipped(reason) => reason.to_string(),
        SessionStatus::Failed(message) => message.clone(),
    }
}

pub fn eligibility_cell(eligible: bool) -> Cell {
    if eligible {
        Cell::new("yes").fg(TableColor::Green)
    } else {
        Cell::new("no").fg(TableColor::DarkGrey)
    }
}
