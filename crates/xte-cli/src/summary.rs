use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::types::{ExportRunResult, FileStatus, ImportRunResult};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_import_summary(result: &ImportRunResult) {
    println!("Output: {}", result.output.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Guides"),
        header_cell("Procedures"),
        header_cell("Records"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    for file in &result.files {
        let status = match &file.status {
            FileStatus::Ok => "ok".to_string(),
            FileStatus::Failed(message) => format!("failed: {message}"),
        };
        table.add_row(vec![
            file.name.clone(),
            file.guides.to_string(),
            file.procedures.to_string(),
            file.records.to_string(),
            status,
        ]);
    }
    println!("{table}");
    println!("Total records: {}", result.total_records);
}

pub fn print_export_summary(result: &ExportRunResult) {
    println!("Output: {}", result.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("File"), header_cell("Bytes")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for file in &result.files {
        table.add_row(vec![file.name.clone(), file.size.to_string()]);
    }
    println!("{table}");
}
