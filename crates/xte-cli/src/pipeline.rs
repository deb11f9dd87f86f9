//! File-level pipeline glue: batch import, consolidated CSV, export runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, info_span, warn};

use xte_ingest::{import_xte, read_flat_csv};
use xte_model::{COLUMNS, RecordTable};
use xte_output::{ExportOptions, export_xte, write_flat_csv};

/// Per-file outcome of a batch import.
#[derive(Debug, Clone)]
pub struct ImportedFile {
    pub name: String,
    pub records: usize,
    pub guides: usize,
    pub procedures: usize,
    /// Parse/read failure message; the file contributed no records.
    pub error: Option<String>,
}

/// Flatten every file sequentially and concatenate the results. A file that
/// fails to parse is reported in its outcome and skipped; it never aborts
/// the rest of the batch.
pub fn import_files(paths: &[PathBuf]) -> (RecordTable, Vec<ImportedFile>) {
    let mut combined = RecordTable::default();
    let mut outcomes = Vec::with_capacity(paths.len());

    for path in paths {
        let name = file_name(path);
        let span = info_span!("import", file = %name);
        let _guard = span.enter();

        let imported = fs::read(path)
            .map_err(|error| error.to_string())
            .and_then(|bytes| {
                import_xte(&bytes, &name).map_err(|error| error.to_string())
            });
        match imported {
            Ok(result) => {
                info!(
                    records = result.table.len(),
                    guides = result.guides,
                    "flattened"
                );
                outcomes.push(ImportedFile {
                    name,
                    records: result.table.len(),
                    guides: result.guides,
                    procedures: result.procedures,
                    error: None,
                });
                combined.extend(result.table);
            }
            Err(message) => {
                warn!(error = message.as_str(), "skipping file");
                outcomes.push(ImportedFile {
                    name,
                    records: 0,
                    guides: 0,
                    procedures: 0,
                    error: Some(message),
                });
            }
        }
    }

    schema_order(&mut combined.columns);
    (combined, outcomes)
}

/// Write the consolidated flat table as `;`-separated CSV.
pub fn write_consolidated_csv(table: &RecordTable, output: &Path) -> Result<()> {
    let csv = write_flat_csv(table).context("serialize consolidated csv")?;
    fs::write(output, csv).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

/// Run the export pipeline over a flat CSV and write every generated
/// document into `output_dir`. Returns the written (name, size) pairs.
pub fn export_csv_file(
    input: &Path,
    output_dir: &Path,
    generation_time: NaiveDateTime,
) -> Result<Vec<(String, usize)>> {
    let table = read_flat_csv(input).with_context(|| format!("read {}", input.display()))?;
    let files = export_xte(&table, &ExportOptions::new(generation_time))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let mut written = Vec::with_capacity(files.len());
    for (name, bytes) in &files {
        let path = output_dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        written.push((name.clone(), bytes.len()));
    }
    info!(
        rows = table.len(),
        documents = written.len() / 2,
        output = %output_dir.display(),
        "export finished"
    );
    Ok(written)
}

/// Restore the fixed schema order after merging tables whose column subsets
/// differ (stable sort keeps any unknown columns at the end).
pub fn schema_order(columns: &mut [String]) {
    columns.sort_by_key(|name| {
        COLUMNS
            .iter()
            .position(|spec| spec.name == name.as_str())
            .unwrap_or(usize::MAX)
    });
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
