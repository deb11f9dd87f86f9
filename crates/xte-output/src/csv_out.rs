//! Flat-table CSV serialization (`;`-separated, consolidated import output).

use csv::WriterBuilder;

use xte_model::{CellValue, RecordTable, Result, XteError};

/// Serialize the table in its column order. Missing cells become empty
/// fields; the null/empty distinction does not survive the tabular form.
pub fn write_flat_csv(table: &RecordTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .map_err(|error| XteError::Csv(error.to_string()))?;
    for record in &table.records {
        let row: Vec<&str> = table
            .columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .and_then(CellValue::as_text)
                    .unwrap_or("")
            })
            .collect();
        writer
            .write_record(&row)
            .map_err(|error| XteError::Csv(error.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|error| XteError::Csv(error.to_string()))
}
