//! Integration tests for the pipeline module.

use std::fs;

use chrono::NaiveDate;

use xte_cli::pipeline::{export_csv_file, import_files, schema_order, write_consolidated_csv};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="iso-8859-1"?>
<ans:mensagemEnvioANS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
  <ans:cabecalho>
    <ans:identificacaoTransacao>
      <ans:tipoTransacao>MONITORAMENTO</ans:tipoTransacao>
      <ans:numeroLote>77</ans:numeroLote>
    </ans:identificacaoTransacao>
    <ans:registroANS>123456</ans:registroANS>
    <ans:versaoPadrao>1.04.01</ans:versaoPadrao>
  </ans:cabecalho>
  <ans:Mensagem>
    <ans:operadoraParaANS>
      <ans:guiaMonitoramento>
        <ans:tipoRegistro>1</ans:tipoRegistro>
        <ans:numeroGuia_prestador>123</ans:numeroGuia_prestador>
        <ans:procedimentos>
          <ans:identProcedimento>
            <ans:codigoTabela>22</ans:codigoTabela>
            <ans:Procedimento>
              <ans:codigoProcedimento>10101012</ans:codigoProcedimento>
            </ans:Procedimento>
          </ans:identProcedimento>
          <ans:valorInformado>25.00</ans:valorInformado>
        </ans:procedimentos>
      </ans:guiaMonitoramento>
    </ans:operadoraParaANS>
  </ans:Mensagem>
</ans:mensagemEnvioANS>
"#;

#[test]
fn bad_files_are_skipped_without_aborting_the_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = dir.path().join("lote1.xte");
    let bad = dir.path().join("broken.xte");
    fs::write(&good, SAMPLE).expect("write sample");
    fs::write(&bad, "definitely not xml").expect("write broken");

    let (table, outcomes) = import_files(&[bad, good]);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].error.is_some());
    assert!(outcomes[1].error.is_none());
    assert_eq!(outcomes[1].guides, 1);
    assert_eq!(outcomes[1].procedures, 1);
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.records[0].trimmed("Origin Name"),
        Some("lote1.xte")
    );
    assert_eq!(table.records[0].trimmed("Procedure Code"), Some("10101012"));
}

#[test]
fn consolidated_csv_round_trips_through_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("lote1.xte");
    fs::write(&source, SAMPLE).expect("write sample");

    let (table, _) = import_files(std::slice::from_ref(&source));
    let csv_path = dir.path().join("consolidated.csv");
    write_consolidated_csv(&table, &csv_path).expect("write csv");
    let csv_text = fs::read_to_string(&csv_path).expect("read csv");
    assert!(csv_text.starts_with("Origin Name;"));
    assert!(csv_text.contains("lote1.xte"));

    let generated = NaiveDate::from_ymd_opt(2024, 4, 2)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap();
    let out_dir = dir.path().join("output");
    let written = export_csv_file(&csv_path, &out_dir, generated).expect("export");

    let names: Vec<&str> = written.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["lote1.xml", "lote1.xte"]);
    let regenerated = fs::read(out_dir.join("lote1.xte")).expect("read output");
    let text = String::from_utf8_lossy(&regenerated);
    assert!(text.contains("<ans:numeroGuia_prestador>123</ans:numeroGuia_prestador>"));
    assert!(text.contains("<ans:codigoProcedimento>10101012</ans:codigoProcedimento>"));
}

#[test]
fn schema_order_restores_the_fixed_column_sequence() {
    let mut columns = vec![
        "Sex".to_string(),
        "Origin Name".to_string(),
        "Birth Date".to_string(),
    ];
    schema_order(&mut columns);
    assert_eq!(columns, vec!["Origin Name", "Sex", "Birth Date"]);
}
