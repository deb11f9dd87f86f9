//! XTE/XML → flat record flattening.
//!
//! One guide fans out into one record per procedure (or a single record when
//! it has none). Header fields are captured once and merged into every
//! record. The walk keys everything by local tag name; the `ans` namespace
//! prefix carried by TISS documents is stripped.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use xte_model::{
    AGE_COLUMN, COLUMNS, CellValue, IDENTIFIER_COLUMNS, ORIGIN_COLUMN, Record, RecordTable,
    Result, XteError, column_for_tag, decode_iso_8859_1,
};
use xte_transform::{
    age_at_realization, format_display, normalize_identifier, parse_lenient,
    reformat_iso_to_display,
};

/// Transaction-identification tags captured from `cabecalho`.
const HEADER_TXN_TAGS: [&str; 5] = [
    "tipoTransacao",
    "numeroLote",
    "competenciaLote",
    "dataRegistroTransacao",
    "horaRegistroTransacao",
];

/// Tags read directly under each `procedimentos` element.
const PROC_DIRECT_TAGS: [&str; 9] = [
    "quantidadeInformada",
    "quantidadePaga",
    "valorInformado",
    "valorPagoProc",
    "valorPagoFornecedor",
    "valorCoParticipacao",
    "unidadeMedida",
    "registroANSOperadoraIntermediaria",
    "tipoAtendimentoOperadoraIntermediaria",
];

/// Per-procedure fields that overwrite the guide-level walk on every emitted
/// record, each defaulting to an empty string when the element is absent.
const PROC_OVERWRITE_TAGS: [&str; 12] = [
    "codigoProcedimento",
    "grupoProcedimento",
    "valorInformado",
    "valorPagoProc",
    "quantidadeInformada",
    "quantidadePaga",
    "valorPagoFornecedor",
    "valorCoParticipacao",
    "unidadeMedida",
    "codigoTabela",
    "registroANSOperadoraIntermediaria",
    "tipoAtendimentoOperadoraIntermediaria",
];

/// Outcome of flattening one document.
#[derive(Debug)]
pub struct ImportResult {
    pub table: RecordTable,
    pub guides: usize,
    pub procedures: usize,
}

#[derive(Debug, Default)]
struct GuideState {
    /// Local tag → element text; `None` marks an element seen without text.
    /// Every descendant lands here, so procedure-scoped tags hold the last
    /// procedure's values as a fallback; emitted records overwrite them.
    fields: BTreeMap<String, Option<String>>,
    procedures: Vec<BTreeMap<&'static str, String>>,
    in_procedure: bool,
}

#[derive(Debug)]
struct RawRow {
    fields: BTreeMap<String, Option<String>>,
    procedure: Option<BTreeMap<&'static str, String>>,
}

/// Flatten one ISO-8859-1 XTE/XML document into the accepted flat schema.
/// `origin_name` is the source-file identity stamped on every record; it is
/// external metadata and overrides anything captured from the XML itself.
pub fn import_xte(bytes: &[u8], origin_name: &str) -> Result<ImportResult> {
    let text = decode_iso_8859_1(bytes)?;
    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut header: Option<BTreeMap<String, String>> = None;
    let mut guide: Option<GuideState> = None;
    let mut rows: Vec<RawRow> = Vec::new();
    let mut guides = 0usize;
    let mut procedures = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) => {
                saw_root = true;
                let local = local_name(element.local_name().as_ref());
                on_element_open(&local, &path, &mut header, &mut guide);
                path.push(local);
            }
            Ok(Event::Empty(ref element)) => {
                saw_root = true;
                let local = local_name(element.local_name().as_ref());
                if guide.is_none() && local == "guiaMonitoramento" {
                    // Self-closing guide: one record, no fields of its own.
                    guides += 1;
                    push_rows(&mut rows, GuideState::default());
                } else {
                    on_element_open(&local, &path, &mut header, &mut guide);
                    if let Some(state) = guide.as_mut() {
                        if local == "procedimentos" {
                            state.in_procedure = false;
                        }
                    }
                }
            }
            Ok(Event::Text(ref element)) => {
                let value = element
                    .xml_content()
                    .map_err(|error| XteError::Parse(error.to_string()))?
                    .into_owned();
                if let Some(state) = guide.as_mut() {
                    on_guide_text(state, &path, value);
                } else if path.iter().any(|name| name == "cabecalho") {
                    on_header_text(header.as_mut(), &path, value);
                }
            }
            Ok(Event::End(_)) => {
                let local = path.pop().unwrap_or_default();
                if let Some(state) = guide.as_mut() {
                    if local == "procedimentos" {
                        state.in_procedure = false;
                    }
                }
                if local == "guiaMonitoramento" {
                    if let Some(state) = guide.take() {
                        guides += 1;
                        procedures += state.procedures.len();
                        push_rows(&mut rows, state);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return Err(XteError::Parse(error.to_string())),
        }
    }

    if !saw_root {
        return Err(XteError::Parse("document has no root element".to_string()));
    }
    if !path.is_empty() {
        return Err(XteError::Parse(format!(
            "unclosed element <{}>",
            path.last().map(String::as_str).unwrap_or_default()
        )));
    }

    debug!(origin = origin_name, guides, procedures, "flattened document");
    Ok(ImportResult {
        table: build_table(rows, header, origin_name),
        guides,
        procedures,
    })
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn on_element_open(
    local: &str,
    path: &[String],
    header: &mut Option<BTreeMap<String, String>>,
    guide: &mut Option<GuideState>,
) {
    if let Some(state) = guide.as_mut() {
        // Last occurrence wins, matching the full-descendant walk.
        state.fields.insert(local.to_string(), None);
        if local == "procedimentos" {
            state.procedures.push(BTreeMap::new());
            state.in_procedure = true;
        }
        return;
    }
    match local {
        "guiaMonitoramento" => {
            *guide = Some(GuideState::default());
        }
        "cabecalho" => {
            let map = header.get_or_insert_with(BTreeMap::new);
            map.insert("registroANS".to_string(), String::new());
            map.insert("versaoPadrao".to_string(), String::new());
        }
        "identificacaoTransacao" if path.iter().any(|name| name == "cabecalho") => {
            if let Some(map) = header.as_mut() {
                for tag in HEADER_TXN_TAGS {
                    map.insert(tag.to_string(), String::new());
                }
            }
        }
        _ => {}
    }
}

fn on_guide_text(state: &mut GuideState, path: &[String], value: String) {
    let leaf = match path.last() {
        Some(leaf) => leaf.clone(),
        None => return,
    };
    let parent = path.len().checked_sub(2).map(|index| path[index].as_str());

    if state.in_procedure {
        if let Some(record) = state.procedures.last_mut() {
            let trimmed = value.trim();
            match parent {
                Some("procedimentos") => {
                    if let Some(tag) = PROC_DIRECT_TAGS.iter().copied().find(|tag| *tag == leaf) {
                        record.insert(tag, trimmed.to_string());
                    }
                }
                Some("identProcedimento") if leaf == "codigoTabela" => {
                    record.insert("codigoTabela", trimmed.to_string());
                }
                Some("Procedimento") if leaf == "codigoProcedimento" => {
                    record.insert("codigoProcedimento", trimmed.to_string());
                }
                Some("Procedimento") if leaf == "grupoProcedimento" => {
                    record.insert("grupoProcedimento", trimmed.to_string());
                }
                _ => {}
            }
        }
    }

    // Generic walk: date-looking tags in ISO form are shown day-first.
    let stored = if leaf.to_ascii_lowercase().contains("data") {
        reformat_iso_to_display(&value).unwrap_or(value)
    } else {
        value
    };
    state.fields.insert(leaf, Some(stored));
}

fn on_header_text(header: Option<&mut BTreeMap<String, String>>, path: &[String], value: String) {
    let Some(map) = header else { return };
    let Some(leaf) = path.last() else { return };
    let parent = path.len().checked_sub(2).map(|index| path[index].as_str());
    match parent {
        Some("identificacaoTransacao") if HEADER_TXN_TAGS.contains(&leaf.as_str()) => {
            map.insert(leaf.clone(), value);
        }
        Some("cabecalho") if leaf == "registroANS" || leaf == "versaoPadrao" => {
            map.insert(leaf.clone(), value);
        }
        _ => {}
    }
}

fn push_rows(rows: &mut Vec<RawRow>, state: GuideState) {
    if state.procedures.is_empty() {
        rows.push(RawRow {
            fields: state.fields,
            procedure: None,
        });
        return;
    }
    for procedure in state.procedures {
        rows.push(RawRow {
            fields: state.fields.clone(),
            procedure: Some(procedure),
        });
    }
}

fn build_table(
    rows: Vec<RawRow>,
    header: Option<BTreeMap<String, String>>,
    origin_name: &str,
) -> RecordTable {
    let mut records: Vec<Record> = Vec::new();
    for row in rows {
        let mut record = Record::new();
        if let Some(header) = header.as_ref() {
            for (tag, value) in header {
                if let Some(spec) = column_for_tag(tag) {
                    record.set(spec.name, CellValue::text(value.clone()));
                }
            }
        }
        for (tag, value) in row.fields {
            if let Some(spec) = column_for_tag(&tag) {
                let cell = match value {
                    Some(text) => CellValue::Text(text),
                    None => CellValue::Missing,
                };
                record.set(spec.name, cell);
            }
        }
        if let Some(procedure) = row.procedure {
            for tag in PROC_OVERWRITE_TAGS {
                if let Some(spec) = column_for_tag(tag) {
                    let value = procedure.get(tag).cloned().unwrap_or_default();
                    record.set(spec.name, CellValue::Text(value));
                }
            }
        }
        // File identity is external metadata, never XML content.
        record.set(ORIGIN_COLUMN, CellValue::text(origin_name));
        records.push(record);
    }

    normalize_date_columns(&mut records);
    derive_age(&mut records);
    normalize_identifiers(&mut records);

    RecordTable {
        columns: restricted_columns(&records),
        records,
    }
}

/// Defensive second pass: every date column is re-parsed leniently; values
/// that still fail become null rather than an error.
fn normalize_date_columns(records: &mut [Record]) {
    for spec in COLUMNS.iter().filter(|spec| spec.is_date()) {
        for record in records.iter_mut() {
            let Some(cell) = record.get(spec.name) else {
                continue;
            };
            let normalized = match cell.as_text().map(parse_lenient) {
                Some(Some(date)) => CellValue::Text(format_display(date)),
                _ => CellValue::Missing,
            };
            record.set(spec.name, normalized);
        }
    }
}

/// Whole years between birth and realization; only derived when both date
/// columns exist in the run, mirroring the tabular column check.
fn derive_age(records: &mut [Record]) {
    let has = |column: &str| records.iter().any(|record| record.contains(column));
    if !(has("Birth Date") && has("Realization Date")) {
        return;
    }
    for record in records.iter_mut() {
        let age = match (record.trimmed("Birth Date"), record.trimmed("Realization Date")) {
            (Some(birth), Some(realization)) => age_at_realization(birth, realization),
            _ => None,
        };
        let cell = match age {
            Some(age) => CellValue::Text(age.to_string()),
            None => CellValue::Missing,
        };
        record.set(AGE_COLUMN, cell);
    }
}

fn normalize_identifiers(records: &mut [Record]) {
    for column in IDENTIFIER_COLUMNS {
        for record in records.iter_mut() {
            if let Some(CellValue::Text(value)) = record.get(column) {
                let normalized = normalize_identifier(value);
                record.set(column, CellValue::Text(normalized));
            }
        }
    }
}

/// Accepted columns that actually occur in this run, in schema order.
fn restricted_columns(records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return vec![ORIGIN_COLUMN.to_string()];
    }
    COLUMNS
        .iter()
        .filter(|spec| records.iter().any(|record| record.contains(spec.name)))
        .map(|spec| spec.name.to_string())
        .collect()
}
