//! Flat records → XTE/XML document generation.
//!
//! One document is produced per distinct `Origin Name`. Within a document,
//! rows regroup into guides by the (provider guide number, operator guide
//! number, reimbursement id) key, and every row of a group becomes one
//! procedure element. Fields use sparse encoding: a blank or missing cell
//! emits no element. The TISS monitoring schema mandates the element order
//! written below.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use xte_model::{
    CellValue, GROUP_KEY_COLUMNS, ORIGIN_COLUMN, ProcedureIdent, Record, RecordTable, Result,
    SUPPLIER_CNPJ_COLUMN, XteError, encode_iso_8859_1,
};
use xte_transform::to_iso_string;

use crate::hash::md5_hex;

/// ANS/TISS schema namespace shared by all monitoring payloads.
pub const ANS_NAMESPACE: &str = "http://www.ans.gov.br/padroes/tiss/schemas";

const MONITORING_SCHEMA: &str = "tissMonitoramentoV1_04_01.xsd";
const TRANSACTION_TYPE: &str = "MONITORAMENTO";
const DEFAULT_SCHEMA_VERSION: &str = "1.04.01";

/// Export parameters. The generation instant is injected so callers (and
/// tests) control the header registration date/time deterministically.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub generation_time: NaiveDateTime,
}

impl ExportOptions {
    pub fn new(generation_time: NaiveDateTime) -> Self {
        Self { generation_time }
    }
}

/// Generate one document per distinct origin, returned as a filename → bytes
/// map with one `.xml` and one `.xte` entry per origin (same bytes).
pub fn export_xte(
    table: &RecordTable,
    options: &ExportOptions,
) -> Result<BTreeMap<String, Vec<u8>>> {
    if !table.has_column(ORIGIN_COLUMN) {
        return Err(XteError::Validation(format!(
            "the '{ORIGIN_COLUMN}' column is mandatory for export"
        )));
    }

    let mut origins: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for record in &table.records {
        // Rows without an origin cannot be attributed to a file.
        let Some(origin) = record.get(ORIGIN_COLUMN).and_then(CellValue::as_text) else {
            continue;
        };
        origins.entry(origin.to_string()).or_default().push(record);
    }

    let mut files = BTreeMap::new();
    for (origin, records) in origins {
        if records.is_empty() {
            continue;
        }
        let bytes = build_document(&records, options)?;
        let base = sanitize_origin(&origin);
        debug!(origin = origin.as_str(), rows = records.len(), "generated document");
        files.insert(format!("{base}.xml"), bytes.clone());
        files.insert(format!("{base}.xte"), bytes);
    }
    Ok(files)
}

/// Origin name without its extension, every character outside
/// `[A-Za-z0-9_-]` replaced by `_`.
pub fn sanitize_origin(origin: &str) -> String {
    let base = match origin.rfind('.') {
        Some(index) if index > 0 => &origin[..index],
        _ => origin,
    };
    base.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

type GroupKey = (Option<String>, Option<String>, Option<String>);

fn group_key(record: &Record) -> GroupKey {
    let cell = |column: &str| {
        record
            .get(column)
            .and_then(CellValue::as_text)
            .map(str::to_string)
    };
    (
        cell(GROUP_KEY_COLUMNS[0]),
        cell(GROUP_KEY_COLUMNS[1]),
        cell(GROUP_KEY_COLUMNS[2]),
    )
}

fn build_document(records: &[&Record], options: &ExportOptions) -> Result<Vec<u8>> {
    // Null keys still form a valid group; nothing is dropped here.
    let mut groups: BTreeMap<GroupKey, Vec<&Record>> = BTreeMap::new();
    for &record in records {
        groups.entry(group_key(record)).or_default().push(record);
    }

    let mut buffer = Vec::new();
    let mut doc = DocumentWriter::new(&mut buffer);
    doc.decl()?;
    doc.start_with_attrs(
        "mensagemEnvioANS",
        &[
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ("xmlns:xsd", "http://www.w3.org/2001/XMLSchema"),
            (
                "xsi:schemaLocation",
                &format!("{ANS_NAMESPACE} {ANS_NAMESPACE}/{MONITORING_SCHEMA}"),
            ),
            ("xmlns:ans", ANS_NAMESPACE),
        ],
    )?;

    let first = records[0];
    write_header(&mut doc, first, options)?;

    doc.start("Mensagem")?;
    doc.start("operadoraParaANS")?;
    for rows in groups.values() {
        write_guide(&mut doc, rows)?;
    }
    doc.end("operadoraParaANS")?;
    doc.end("Mensagem")?;

    // The digest covers the ISO-8859-1 bytes of all text written so far
    // (header + message), concatenated in document order.
    let digest = md5_hex(&encode_iso_8859_1(&doc.content)?);
    doc.start("epilogo")?;
    doc.uncaptured_leaf("hash", &digest)?;
    doc.end("epilogo")?;
    doc.end("mensagemEnvioANS")?;

    let text = String::from_utf8(buffer)
        .map_err(|error| XteError::Serialize(error.to_string()))?;
    encode_iso_8859_1(&text)
}

fn write_header(doc: &mut DocumentWriter<'_>, row: &Record, options: &ExportOptions) -> Result<()> {
    doc.start("cabecalho")?;
    doc.start("identificacaoTransacao")?;
    doc.leaf("tipoTransacao", TRANSACTION_TYPE)?;
    doc.leaf_from(row, "numeroLote", "Batch Number")?;
    doc.leaf_from(row, "competenciaLote", "Batch Period")?;
    let generated = options.generation_time;
    doc.leaf(
        "dataRegistroTransacao",
        &generated.format("%Y-%m-%d").to_string(),
    )?;
    doc.leaf(
        "horaRegistroTransacao",
        &generated.format("%H:%M:%S").to_string(),
    )?;
    doc.end("identificacaoTransacao")?;
    doc.leaf_from(row, "registroANS", "Operator Registry")?;
    doc.leaf(
        "versaoPadrao",
        row.trimmed("Schema Version").unwrap_or(DEFAULT_SCHEMA_VERSION),
    )?;
    doc.end("cabecalho")
}

fn write_guide(doc: &mut DocumentWriter<'_>, rows: &[&Record]) -> Result<()> {
    let first = rows[0];
    doc.start("guiaMonitoramento")?;

    doc.leaf_from(first, "tipoRegistro", "Registry Type")?;
    doc.leaf_from(first, "versaoTISSPrestador", "TISS Provider Version")?;
    doc.leaf_from(first, "formaEnvio", "Submission Form")?;

    doc.start("dadosContratadoExecutante")?;
    doc.leaf_from(first, "CNES", "CNES")?;
    doc.leaf_from(first, "identificadorExecutante", "Executing Provider Id")?;
    doc.leaf_from(first, "codigoCNPJ_CPF", "CNPJ/CPF Code")?;
    doc.leaf_from(first, "municipioExecutante", "Executing Municipality")?;
    doc.end("dadosContratadoExecutante")?;

    doc.leaf_from(
        first,
        "registroANSOperadoraIntermediaria",
        "Intermediary-Operator Registry",
    )?;
    doc.leaf_from(
        first,
        "tipoAtendimentoOperadoraIntermediaria",
        "Intermediary-Operator Care Type",
    )?;

    doc.start("dadosBeneficiario")?;
    doc.start("identBeneficiario")?;
    doc.leaf_from(first, "numeroCartaoNacionalSaude", "National Health Card Number")?;
    doc.leaf_from(first, "cpfBeneficiario", "Beneficiary CPF")?;
    // Anything but the two schema codes is suppressed.
    let sex = first.trimmed("Sex").unwrap_or_default();
    if sex == "1" || sex == "3" {
        doc.leaf("sexo", sex)?;
    }
    doc.leaf_date_from(first, "dataNascimento", "Birth Date")?;
    doc.leaf_from(first, "municipioResidencia", "Residence Municipality")?;
    doc.end("identBeneficiario")?;
    doc.leaf_from(first, "numeroRegistroPlano", "Plan Registration Number")?;
    doc.end("dadosBeneficiario")?;

    doc.leaf_from(first, "tipoEventoAtencao", "Care Event Type")?;
    doc.leaf_from(first, "origemEventoAtencao", "Care Event Origin")?;
    doc.leaf_from(first, "numeroGuia_prestador", "Provider Guide Number")?;
    doc.leaf_from(first, "numeroGuia_operadora", "Operator Guide Number")?;
    doc.leaf_from(first, "identificacaoReembolso", "Reimbursement Id")?;
    doc.leaf_from(first, "numeroGuiaSPSADTPrincipal", "Principal SPSADT Guide Number")?;

    let remuneration_form = first.trimmed("Remuneration Form");
    let remuneration_value = first.trimmed("Remuneration Value");
    if remuneration_form.is_some() || remuneration_value.is_some() {
        doc.start("formasRemuneracao")?;
        doc.leaf("formaRemuneracao", remuneration_form.unwrap_or_default())?;
        doc.leaf("valorRemuneracao", remuneration_value.unwrap_or_default())?;
        doc.end("formasRemuneracao")?;
    }

    doc.leaf_date_from(first, "dataAutorizacao", "Authorization Date")?;
    doc.leaf_date_from(first, "dataRealizacao", "Realization Date")?;
    doc.leaf_date_from(first, "dataProtocoloCobranca", "Billing Protocol Date")?;
    doc.leaf_date_from(first, "dataPagamento", "Payment Date")?;
    doc.leaf_date_from(first, "dataProcessamentoGuia", "Guide Processing Date")?;
    doc.leaf_date_from(first, "dataFimPeriodo", "End-of-Period Date")?;

    doc.leaf_from(first, "tipoConsulta", "Consultation Type")?;
    doc.leaf_from(first, "indicacaoRecemNato", "Newborn Indicator")?;
    doc.leaf_from(first, "indicacaoAcidente", "Accident Indicator")?;
    doc.leaf_from(first, "caraterAtendimento", "Care Character")?;
    doc.leaf_from(first, "tipoAtendimento", "Care Type")?;
    doc.leaf_from(first, "regimeAtendimento", "Care Regime")?;
    doc.leaf_from(first, "tipoInternacao", "Admission Type")?;
    doc.leaf_from(first, "regimeInternacao", "Admission Regime")?;
    doc.leaf_from(first, "tipoFaturamento", "Billing Type")?;
    doc.leaf_from(first, "motivoSaida", "Discharge Reason")?;
    doc.leaf_from(first, "cboExecutante", "Executing CBO")?;

    if let Some(diagnosis) = first.trimmed("CID Diagnosis") {
        doc.start("diagnosticosCID10")?;
        doc.leaf("diagnosticoCID", diagnosis)?;
        doc.end("diagnosticosCID10")?;
    }

    doc.start("valoresGuia")?;
    doc.leaf_from(first, "valorTotalInformado", "Total Informed Value")?;
    doc.leaf_from(first, "valorProcessado", "Processed Value")?;
    doc.leaf_from(first, "valorTotalPagoProcedimentos", "Total Paid-Procedures Value")?;
    doc.leaf_from(first, "valorTotalDiarias", "Total Daily-Rate Value")?;
    doc.leaf_from(first, "valorTotalTaxas", "Total Tax Value")?;
    doc.leaf_from(first, "valorTotalMateriais", "Total Materials Value")?;
    doc.leaf_from(first, "valorTotalOPME", "Total OPME Value")?;
    doc.leaf_from(first, "valorTotalMedicamentos", "Total Medication Value")?;
    doc.leaf_from(first, "valorGlosaGuia", "Total Write-off Value")?;
    doc.leaf_from(first, "valorPagoGuia", "Total Paid-Guide Value")?;
    doc.leaf_from(first, "valorPagoFornecedores", "Total Paid-Suppliers Value")?;
    doc.leaf_from(first, "valorTotalTabelaPropria", "Total Own-Table Value")?;
    doc.leaf_from(first, "valorTotalCoParticipacao", "Total Co-Payment Value")?;
    doc.end("valoresGuia")?;

    doc.leaf_from(first, "declaracaoObito", "Death Declaration")?;
    doc.leaf_from(first, "declaracaoNascido", "Birth Declaration")?;

    for row in rows {
        write_procedure(doc, row)?;
    }

    doc.end("guiaMonitoramento")
}

fn write_procedure(doc: &mut DocumentWriter<'_>, row: &Record) -> Result<()> {
    doc.start("procedimentos")?;
    doc.start("identProcedimento")?;
    doc.leaf_from(row, "codigoTabela", "Table Code")?;
    doc.start("Procedimento")?;
    let ident = ProcedureIdent::from_fields(
        row.trimmed("Procedure Group"),
        row.trimmed("Procedure Code"),
    );
    if let Some(ident) = ident {
        doc.leaf(ident.tag(), ident.value())?;
    }
    doc.end("Procedimento")?;
    doc.end("identProcedimento")?;

    doc.leaf_from(row, "quantidadeInformada", "Informed Quantity")?;
    doc.leaf_from(row, "valorInformado", "Informed Value")?;
    doc.leaf_from(row, "quantidadePaga", "Paid Quantity")?;
    doc.leaf_from(row, "unidadeMedida", "Unit of Measure")?;
    doc.leaf_from(row, "valorPagoProc", "Paid Value (Procedure)")?;
    doc.leaf_from(row, "cnpjFornecedor", SUPPLIER_CNPJ_COLUMN)?;
    doc.leaf_from(row, "valorPagoFornecedor", "Paid-Supplier Value")?;
    doc.leaf_from(row, "valorCoParticipacao", "Co-Payment Value")?;
    doc.leaf_from(
        row,
        "registroANSOperadoraIntermediaria",
        "Intermediary-Operator Registry",
    )?;
    doc.leaf_from(
        row,
        "tipoAtendimentoOperadoraIntermediaria",
        "Intermediary-Operator Care Type",
    )?;

    doc.end("procedimentos")
}

/// Indented XML writer that accumulates every captured text value for the
/// epilogue digest.
struct DocumentWriter<'a> {
    writer: Writer<&'a mut Vec<u8>>,
    content: String,
}

impl<'a> DocumentWriter<'a> {
    fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self {
            writer: Writer::new_with_indent(buffer, b' ', 2),
            content: String::new(),
        }
    }

    fn decl(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("iso-8859-1"), None)))
            .map_err(serialize_error)
    }

    fn start(&mut self, tag: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(format!("ans:{tag}"))))
            .map_err(serialize_error)
    }

    fn start_with_attrs(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(format!("ans:{tag}"));
        for (key, value) in attrs {
            element.push_attribute((*key, *value));
        }
        self.writer
            .write_event(Event::Start(element))
            .map_err(serialize_error)
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(format!("ans:{tag}"))))
            .map_err(serialize_error)
    }

    /// Write `<ans:tag>value</ans:tag>` when `value` is non-blank; the
    /// trimmed text joins the digest content.
    fn leaf(&mut self, tag: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.write_leaf(tag, trimmed)?;
        self.content.push_str(trimmed);
        Ok(())
    }

    /// Leaf sourced from a record column.
    fn leaf_from(&mut self, row: &Record, tag: &str, column: &str) -> Result<()> {
        self.leaf(tag, row.trimmed(column).unwrap_or_default())
    }

    /// Date leaf: the flat value is converted to ISO form first; values that
    /// fail every accepted date shape emit nothing.
    fn leaf_date_from(&mut self, row: &Record, tag: &str, column: &str) -> Result<()> {
        let Some(raw) = row.trimmed(column) else {
            return Ok(());
        };
        match to_iso_string(raw) {
            Some(iso) => self.leaf(tag, &iso),
            None => Ok(()),
        }
    }

    /// Leaf written after the digest is sealed (the epilogue hash itself).
    fn uncaptured_leaf(&mut self, tag: &str, value: &str) -> Result<()> {
        self.write_leaf(tag, value)
    }

    fn write_leaf(&mut self, tag: &str, value: &str) -> Result<()> {
        let name = format!("ans:{tag}");
        self.writer
            .write_event(Event::Start(BytesStart::new(name.as_str())))
            .map_err(serialize_error)?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(serialize_error)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(serialize_error)
    }
}

fn serialize_error(error: impl std::fmt::Display) -> XteError {
    XteError::Serialize(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_everything_outside_the_safe_set() {
        assert_eq!(sanitize_origin("Clinic #1 (March).xte"), "Clinic__1__March_");
        assert_eq!(sanitize_origin("lote_2024-03.xml"), "lote_2024-03");
        assert_eq!(sanitize_origin("plain"), "plain");
        // A leading dot is not an extension.
        assert_eq!(sanitize_origin(".xte"), "_xte");
    }
}
