use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::Local;
use comfy_table::Table;

use xte_cli::pipeline::{export_csv_file, import_files, write_consolidated_csv};
use xte_model::{COLUMNS, tag_for_column};

use crate::cli::{ExportArgs, ImportArgs};
use crate::summary::apply_table_style;
use crate::types::{ExportRunResult, FileStatus, FileSummary, GeneratedFile, ImportRunResult};

/// Flatten every input file sequentially into one consolidated CSV.
pub fn run_import(args: &ImportArgs) -> Result<ImportRunResult> {
    let (combined, outcomes) = import_files(&args.files);
    if outcomes.iter().all(|outcome| outcome.error.is_some()) {
        return Err(anyhow!("no input file could be imported"));
    }
    write_consolidated_csv(&combined, &args.output)?;

    let files = outcomes
        .into_iter()
        .map(|outcome| FileSummary {
            name: outcome.name,
            records: outcome.records,
            guides: outcome.guides,
            procedures: outcome.procedures,
            status: match outcome.error {
                None => FileStatus::Ok,
                Some(message) => FileStatus::Failed(message),
            },
        })
        .collect();

    Ok(ImportRunResult {
        files,
        total_records: combined.len(),
        output: args.output.clone(),
    })
}

/// Rebuild per-origin XTE/XML documents from a flat CSV. The generation
/// instant for the header registration fields is taken once, here, and
/// injected into the pure export core.
pub fn run_export(args: &ExportArgs) -> Result<ExportRunResult> {
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("output")
    });
    let written = export_csv_file(&args.input, &output_dir, Local::now().naive_local())?;
    let files = written
        .into_iter()
        .map(|(name, size)| GeneratedFile { name, size })
        .collect();
    Ok(ExportRunResult { output_dir, files })
}

/// Print the accepted flat schema.
pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Column", "XML tag"]);
    apply_table_style(&mut table);
    for spec in COLUMNS {
        let tag = tag_for_column(spec.name).unwrap_or("-");
        table.add_row(vec![spec.name, tag]);
    }
    println!("{table}");
    Ok(())
}
