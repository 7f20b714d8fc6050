//! Result table rendering

use comfy_table::{Cell, ContentArrangement, Table};

use crate::schema::Column;
use crate::storage::Record;

/// Message shown instead of an empty table.
pub const NO_RECORDS: &str = "No records to display.";

/// Renders records as a table with one column per schema column.
///
/// Fields missing from a record render as empty cells.
pub fn format_records(records: &[Record], columns: &[Column]) -> String {
    if records.is_empty() {
        return NO_RECORDS.to_string();
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::ASCII_FULL)
        .set_header(columns.iter().map(|c| Cell::new(&c.name)));

    for record in records {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|c| match record.get(&c.name) {
                Some(value) => Cell::new(value.to_string()),
                None => Cell::new(""),
            })
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}
