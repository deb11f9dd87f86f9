//! Flat-table CSV loading for the export pipeline's input.
//!
//! The tabular interchange form is `;`-separated text with the accepted
//! column headers on the first row. Headers are matched verbatim after
//! whitespace/BOM cleanup; unrecognized columns are carried through and
//! simply ignored downstream.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use xte_model::{CellValue, Record, RecordTable, Result, XteError};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a `;`-delimited flat table from a file path.
pub fn read_flat_csv(path: &Path) -> Result<RecordTable> {
    let reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|error| XteError::Csv(format!("read {}: {error}", path.display())))?;
    read_rows(reader)
}

/// Read a `;`-delimited flat table from any reader (tests, in-memory input).
pub fn read_flat_csv_from_reader<R: Read>(input: R) -> Result<RecordTable> {
    let reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    read_rows(reader)
}

fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<RecordTable> {
    let mut headers: Option<Vec<String>> = None;
    let mut table = RecordTable::default();

    for row in reader.records() {
        let row = row.map_err(|error| XteError::Csv(error.to_string()))?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match headers.as_ref() {
            None => {
                let parsed: Vec<String> = row.iter().map(normalize_header).collect();
                table.columns = parsed.clone();
                headers = Some(parsed);
            }
            Some(headers) => {
                let mut record = Record::new();
                for (index, header) in headers.iter().enumerate() {
                    if header.is_empty() {
                        continue;
                    }
                    let value = row.get(index).map(normalize_cell).unwrap_or_default();
                    let cell = if value.is_empty() {
                        CellValue::Missing
                    } else {
                        CellValue::Text(value)
                    };
                    record.set(header.clone(), cell);
                }
                table.push(record);
            }
        }
    }

    debug!(columns = table.columns.len(), records = table.len(), "loaded flat csv");
    Ok(table)
}
