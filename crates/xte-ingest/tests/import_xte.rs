//! Integration tests for XTE/XML flattening.

use xte_ingest::import_xte;
use xte_model::{CellValue, XteError, encode_iso_8859_1};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="iso-8859-1"?>
<ans:mensagemEnvioANS xmlns:ans="http://www.ans.gov.br/padroes/tiss/schemas">
  <ans:cabecalho>
    <ans:identificacaoTransacao>
      <ans:tipoTransacao>MONITORAMENTO</ans:tipoTransacao>
      <ans:numeroLote>77</ans:numeroLote>
      <ans:competenciaLote>202403</ans:competenciaLote>
      <ans:dataRegistroTransacao>2024-04-02</ans:dataRegistroTransacao>
      <ans:horaRegistroTransacao>10:15:00</ans:horaRegistroTransacao>
    </ans:identificacaoTransacao>
    <ans:registroANS>123456</ans:registroANS>
    <ans:versaoPadrao>1.04.01</ans:versaoPadrao>
  </ans:cabecalho>
  <ans:Mensagem>
    <ans:operadoraParaANS>
      <ans:guiaMonitoramento>
        <ans:tipoRegistro>1</ans:tipoRegistro>
        <ans:dadosBeneficiario>
          <ans:identBeneficiario>
            <ans:sexo>1</ans:sexo>
            <ans:dataNascimento>2000-01-01</ans:dataNascimento>
            <ans:municipioResidencia>355030</ans:municipioResidencia>
          </ans:identBeneficiario>
        </ans:dadosBeneficiario>
        <ans:numeroGuia_prestador>000123</ans:numeroGuia_prestador>
        <ans:numeroGuia_operadora>98765</ans:numeroGuia_operadora>
        <ans:dataRealizacao>2024-01-01</ans:dataRealizacao>
        <ans:algoDesconhecido>ignored</ans:algoDesconhecido>
        <ans:valoresGuia>
          <ans:valorTotalInformado>55.00</ans:valorTotalInformado>
        </ans:valoresGuia>
        <ans:procedimentos>
          <ans:identProcedimento>
            <ans:codigoTabela>22</ans:codigoTabela>
            <ans:Procedimento>
              <ans:codigoProcedimento>10101012</ans:codigoProcedimento>
            </ans:Procedimento>
          </ans:identProcedimento>
          <ans:quantidadeInformada>1</ans:quantidadeInformada>
          <ans:valorInformado>25.00</ans:valorInformado>
        </ans:procedimentos>
        <ans:procedimentos>
          <ans:identProcedimento>
            <ans:codigoTabela>22</ans:codigoTabela>
            <ans:Procedimento>
              <ans:grupoProcedimento>03</ans:grupoProcedimento>
            </ans:Procedimento>
          </ans:identProcedimento>
          <ans:quantidadeInformada>2</ans:quantidadeInformada>
          <ans:valorInformado>30.00</ans:valorInformado>
        </ans:procedimentos>
      </ans:guiaMonitoramento>
      <ans:guiaMonitoramento>
        <ans:tipoRegistro>1</ans:tipoRegistro>
        <ans:numeroGuia_prestador>555</ans:numeroGuia_prestador>
        <ans:tipoConsulta></ans:tipoConsulta>
        <ans:motivoSaida>Alta a pedido</ans:motivoSaida>
      </ans:guiaMonitoramento>
    </ans:operadoraParaANS>
  </ans:Mensagem>
</ans:mensagemEnvioANS>
"#;

fn sample_bytes() -> Vec<u8> {
    encode_iso_8859_1(SAMPLE).expect("sample is latin-1 encodable")
}

#[test]
fn one_record_per_procedure_plus_bare_guides() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    assert_eq!(result.guides, 2);
    assert_eq!(result.procedures, 2);
    // Two procedure rows for guide one, one row for the procedure-less guide.
    assert_eq!(result.table.len(), 3);
}

#[test]
fn procedure_fields_overwrite_the_guide_walk() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    let first = &result.table.records[0];
    let second = &result.table.records[1];

    assert_eq!(first.trimmed("Procedure Code"), Some("10101012"));
    assert_eq!(first.get("Procedure Group"), Some(&CellValue::text("")));
    assert_eq!(first.trimmed("Informed Value"), Some("25.00"));
    assert_eq!(first.trimmed("Informed Quantity"), Some("1"));
    assert_eq!(first.trimmed("Table Code"), Some("22"));
    // Absent per-procedure fields default to empty string, not null.
    assert_eq!(first.get("Paid Quantity"), Some(&CellValue::text("")));

    assert_eq!(second.trimmed("Procedure Group"), Some("03"));
    assert_eq!(second.get("Procedure Code"), Some(&CellValue::text("")));
    assert_eq!(second.trimmed("Informed Value"), Some("30.00"));

    // Guide-level fields propagate to every procedure row.
    assert_eq!(first.trimmed("Total Informed Value"), Some("55.00"));
    assert_eq!(second.trimmed("Total Informed Value"), Some("55.00"));
}

#[test]
fn header_fields_merge_into_every_record() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    for record in &result.table.records {
        assert_eq!(record.trimmed("Transaction Type"), Some("MONITORAMENTO"));
        assert_eq!(record.trimmed("Batch Number"), Some("77"));
        assert_eq!(record.trimmed("Batch Period"), Some("202403"));
        assert_eq!(record.trimmed("Operator Registry"), Some("123456"));
        assert_eq!(record.trimmed("Schema Version"), Some("1.04.01"));
        assert_eq!(record.trimmed("Transaction Registration Time"), Some("10:15:00"));
        // Dates normalize to the display form, header dates included.
        assert_eq!(
            record.trimmed("Transaction Registration Date"),
            Some("02/04/2024")
        );
    }
}

#[test]
fn dates_canonicalize_and_age_derives() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    let first = &result.table.records[0];
    assert_eq!(first.trimmed("Birth Date"), Some("01/01/2000"));
    assert_eq!(first.trimmed("Realization Date"), Some("01/01/2024"));
    assert_eq!(first.trimmed("Age at Realization"), Some("24"));

    // The bare guide has no realization date, so age is null, not an error.
    let bare = &result.table.records[2];
    assert_eq!(bare.get("Age at Realization"), Some(&CellValue::Missing));
}

#[test]
fn identifier_columns_lose_leading_zeros() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    assert_eq!(
        result.table.records[0].trimmed("Provider Guide Number"),
        Some("123")
    );
    assert_eq!(
        result.table.records[0].trimmed("Operator Guide Number"),
        Some("98765")
    );
}

#[test]
fn origin_is_stamped_and_columns_restricted() {
    let result = import_xte(&sample_bytes(), "lote março.xte").expect("import");
    let table = &result.table;

    for record in &table.records {
        assert_eq!(record.trimmed("Origin Name"), Some("lote março.xte"));
    }
    assert_eq!(table.columns[0], "Origin Name");
    assert!(!table.has_column("algoDesconhecido"));
    assert!(!table.has_column("operadoraParaANS"));

    // Emitted columns keep the fixed schema order.
    let position = |name: &str| {
        table
            .columns
            .iter()
            .position(|column| column == name)
            .unwrap_or_else(|| panic!("missing column {name}"))
    };
    assert!(position("Sex") < position("Birth Date"));
    assert!(position("Provider Guide Number") < position("Realization Date"));
    assert!(position("Age at Realization") < position("Transaction Type"));
}

#[test]
fn empty_elements_import_as_null() {
    let result = import_xte(&sample_bytes(), "lote1.xte").expect("import");
    let bare = &result.table.records[2];
    assert_eq!(bare.get("Consultation Type"), Some(&CellValue::Missing));
    assert_eq!(bare.trimmed("Discharge Reason"), Some("Alta a pedido"));
    // Procedure columns exist in the run but this guide never had them.
    assert_eq!(bare.get("Procedure Code"), None);
}

#[test]
fn latin1_bytes_decode() {
    let doc = SAMPLE.replace("Alta a pedido", "Óbito declarado");
    let bytes = encode_iso_8859_1(&doc).expect("encode");
    let result = import_xte(&bytes, "lote1.xte").expect("import");
    assert_eq!(
        result.table.records[2].trimmed("Discharge Reason"),
        Some("Óbito declarado")
    );
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let error = import_xte(b"<ans:mensagemEnvioANS><ans:cabecalho>", "bad.xte").unwrap_err();
    assert!(matches!(error, XteError::Parse(_)), "got {error:?}");

    let error = import_xte(b"this is not xml at all", "bad.xte").unwrap_err();
    assert!(matches!(error, XteError::Parse(_)), "got {error:?}");
}
