//! Structural round-trip: export → import reconstructs the same shape.

use chrono::NaiveDate;

use xte_ingest::import_xte;
use xte_model::{CellValue, Record, RecordTable};
use xte_output::{ExportOptions, export_xte};

fn options() -> ExportOptions {
    let generated = NaiveDate::from_ymd_opt(2024, 4, 2)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap();
    ExportOptions::new(generated)
}

fn row(pairs: &[(&str, &str)]) -> Record {
    let mut record = Record::new();
    for (column, value) in pairs {
        record.set(*column, CellValue::text(*value));
    }
    record
}

#[test]
fn export_then_import_preserves_guides_procedures_and_fields() {
    let columns = [
        "Origin Name",
        "Provider Guide Number",
        "Operator Guide Number",
        "Reimbursement Id",
        "Sex",
        "Birth Date",
        "Realization Date",
        "Batch Number",
        "Operator Registry",
        "Procedure Code",
        "Informed Value",
        "Informed Quantity",
        "Total Informed Value",
    ];
    let mut input = RecordTable::new(columns.iter().map(|c| (*c).to_string()).collect());
    // Guide 123: two procedures.
    input.push(row(&[
        ("Origin Name", "lote1.xte"),
        ("Provider Guide Number", "123"),
        ("Sex", "1"),
        ("Birth Date", "01/01/2000"),
        ("Realization Date", "01/01/2024"),
        ("Batch Number", "77"),
        ("Operator Registry", "123456"),
        ("Procedure Code", "10101012"),
        ("Informed Value", "25.00"),
        ("Informed Quantity", "1"),
        ("Total Informed Value", "55.00"),
    ]));
    input.push(row(&[
        ("Origin Name", "lote1.xte"),
        ("Provider Guide Number", "123"),
        ("Sex", "1"),
        ("Birth Date", "01/01/2000"),
        ("Realization Date", "01/01/2024"),
        ("Batch Number", "77"),
        ("Operator Registry", "123456"),
        ("Procedure Code", "10101039"),
        ("Informed Value", "30.00"),
        ("Informed Quantity", "2"),
        ("Total Informed Value", "55.00"),
    ]));
    // Guide 456: one procedure.
    input.push(row(&[
        ("Origin Name", "lote1.xte"),
        ("Provider Guide Number", "456"),
        ("Realization Date", "15/03/2024"),
        ("Batch Number", "77"),
        ("Operator Registry", "123456"),
        ("Procedure Code", "20101010"),
        ("Informed Value", "10.00"),
    ]));

    let files = export_xte(&input, &options()).expect("export");
    let bytes = files.get("lote1.xte").expect("generated file");

    let reimported = import_xte(bytes, "lote1.xte").expect("import");
    assert_eq!(reimported.guides, 2);
    assert_eq!(reimported.procedures, 3);
    assert_eq!(reimported.table.len(), 3);

    // Groups come back in key order: guide 123 first.
    let first = &reimported.table.records[0];
    assert_eq!(first.trimmed("Provider Guide Number"), Some("123"));
    assert_eq!(first.trimmed("Sex"), Some("1"));
    // Dates survive the ISO wire form and return in display form.
    assert_eq!(first.trimmed("Birth Date"), Some("01/01/2000"));
    assert_eq!(first.trimmed("Realization Date"), Some("01/01/2024"));
    assert_eq!(first.trimmed("Age at Realization"), Some("24"));
    assert_eq!(first.trimmed("Procedure Code"), Some("10101012"));
    assert_eq!(first.trimmed("Informed Value"), Some("25.00"));
    assert_eq!(first.trimmed("Total Informed Value"), Some("55.00"));
    // Header values round-trip; the registration date is the injected clock.
    assert_eq!(first.trimmed("Transaction Type"), Some("MONITORAMENTO"));
    assert_eq!(first.trimmed("Batch Number"), Some("77"));
    assert_eq!(
        first.trimmed("Transaction Registration Date"),
        Some("02/04/2024")
    );

    let third = &reimported.table.records[2];
    assert_eq!(third.trimmed("Provider Guide Number"), Some("456"));
    assert_eq!(third.trimmed("Procedure Code"), Some("20101010"));
    // This guide never had a sex element, so the field comes back absent.
    assert_eq!(third.get("Sex"), None);
}

#[test]
fn sparse_fields_reimport_as_null_not_empty() {
    let mut input = RecordTable::new(vec![
        "Origin Name".to_string(),
        "Provider Guide Number".to_string(),
        "CNES".to_string(),
    ]);
    input.push(row(&[
        ("Origin Name", "lote1.xte"),
        ("Provider Guide Number", "123"),
        ("CNES", ""),
    ]));

    let files = export_xte(&input, &options()).expect("export");
    let reimported = import_xte(&files["lote1.xte"], "lote1.xte").expect("import");
    let record = &reimported.table.records[0];
    // The blank CNES produced no element, so it does not exist on re-import.
    assert_eq!(record.get("CNES"), None);
    assert!(!reimported.table.has_column("CNES"));
}

#[test]
fn reexporting_imported_records_is_stable() {
    let mut input = RecordTable::new(vec![
        "Origin Name".to_string(),
        "Provider Guide Number".to_string(),
        "Procedure Code".to_string(),
        "Informed Value".to_string(),
    ]);
    input.push(row(&[
        ("Origin Name", "lote1.xte"),
        ("Provider Guide Number", "123"),
        ("Procedure Code", "10101012"),
        ("Informed Value", "25.00"),
    ]));

    let first = export_xte(&input, &options()).expect("first export");
    let imported = import_xte(&first["lote1.xte"], "lote1.xte").expect("import");
    let second = export_xte(&imported.table, &options()).expect("second export");
    assert_eq!(first["lote1.xte"], second["lote1.xte"]);
}
