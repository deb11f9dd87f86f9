//! The fixed flat-row column schema for TISS monitoring records.
//!
//! One row of the flat model is one procedure (or one guide without
//! procedures). Every accepted column is listed here, in the exact order the
//! import pipeline emits and the export pipeline consumes. Most columns are
//! bound to an ANS/TISS XML local tag; `Origin Name` (external file identity)
//! and `Age at Realization` (derived) have no tag.

/// One column of the flat schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column header as it appears in the tabular form.
    pub name: &'static str,
    /// Bound XML local tag, if any.
    pub tag: Option<&'static str>,
}

impl ColumnSpec {
    /// Date columns are recognized by their tag containing `data`
    /// (case-insensitive), the ANS convention for date elements.
    pub fn is_date(&self) -> bool {
        self.tag
            .is_some_and(|tag| tag.to_ascii_lowercase().contains("data"))
    }
}

const fn col(name: &'static str, tag: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        tag: Some(tag),
    }
}

/// Column carrying the source-file identity; mandatory on export.
pub const ORIGIN_COLUMN: &str = "Origin Name";

/// Derived column: whole years between birth and realization dates.
pub const AGE_COLUMN: &str = "Age at Realization";

/// Export-only column feeding the procedure-level supplier CNPJ element.
/// Not part of the accepted import schema, so round-trips leave it absent.
pub const SUPPLIER_CNPJ_COLUMN: &str = "Supplier CNPJ";

/// Guide grouping key: rows sharing these three values (within one origin)
/// collapse into a single guide on export.
pub const GROUP_KEY_COLUMNS: [&str; 3] = [
    "Provider Guide Number",
    "Operator Guide Number",
    "Reimbursement Id",
];

/// Identifier columns subject to the digit-only integer round-trip
/// normalization on import. Same set as the grouping key.
pub const IDENTIFIER_COLUMNS: [&str; 3] = GROUP_KEY_COLUMNS;

/// The accepted flat columns, in emission order. Anything outside this list
/// is dropped by the importer and ignored by the exporter.
pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: ORIGIN_COLUMN,
        tag: None,
    },
    col("Registry Type", "tipoRegistro"),
    col("TISS Provider Version", "versaoTISSPrestador"),
    col("Submission Form", "formaEnvio"),
    col("CNES", "CNES"),
    col("Executing Provider Id", "identificadorExecutante"),
    col("CNPJ/CPF Code", "codigoCNPJ_CPF"),
    col("Executing Municipality", "municipioExecutante"),
    col("National Health Card Number", "numeroCartaoNacionalSaude"),
    col("Beneficiary CPF", "cpfBeneficiario"),
    col("Sex", "sexo"),
    col("Birth Date", "dataNascimento"),
    col("Residence Municipality", "municipioResidencia"),
    col("Plan Registration Number", "numeroRegistroPlano"),
    col("Care Event Type", "tipoEventoAtencao"),
    col("Care Event Origin", "origemEventoAtencao"),
    col("Provider Guide Number", "numeroGuia_prestador"),
    col("Operator Guide Number", "numeroGuia_operadora"),
    col("Reimbursement Id", "identificacaoReembolso"),
    col("Remuneration Form", "formaRemuneracao"),
    col("Remuneration Value", "valorRemuneracao"),
    col("Authorization Date", "dataAutorizacao"),
    col("Realization Date", "dataRealizacao"),
    col("Billing Protocol Date", "dataProtocoloCobranca"),
    col("Payment Date", "dataPagamento"),
    col("Guide Processing Date", "dataProcessamentoGuia"),
    col("Consultation Type", "tipoConsulta"),
    col("Newborn Indicator", "indicacaoRecemNato"),
    col("Accident Indicator", "indicacaoAcidente"),
    col("Care Character", "caraterAtendimento"),
    col("Care Type", "tipoAtendimento"),
    col("Care Regime", "regimeAtendimento"),
    col("Total Informed Value", "valorTotalInformado"),
    col("Processed Value", "valorProcessado"),
    col("Total Paid-Procedures Value", "valorTotalPagoProcedimentos"),
    col("Total Daily-Rate Value", "valorTotalDiarias"),
    col("Total Tax Value", "valorTotalTaxas"),
    col("Total Materials Value", "valorTotalMateriais"),
    col("Total OPME Value", "valorTotalOPME"),
    col("Total Medication Value", "valorTotalMedicamentos"),
    col("Total Write-off Value", "valorGlosaGuia"),
    col("Total Paid-Guide Value", "valorPagoGuia"),
    col("Total Paid-Suppliers Value", "valorPagoFornecedores"),
    col("Total Own-Table Value", "valorTotalTabelaPropria"),
    col("Total Co-Payment Value", "valorTotalCoParticipacao"),
    col("Table Code", "codigoTabela"),
    col("Procedure Group", "grupoProcedimento"),
    col("Informed Quantity", "quantidadeInformada"),
    col("Procedure Code", "codigoProcedimento"),
    col("Informed Value", "valorInformado"),
    col("Paid Value (Procedure)", "valorPagoProc"),
    col("Paid Quantity", "quantidadePaga"),
    col("Paid-Supplier Value", "valorPagoFornecedor"),
    col("Co-Payment Value", "valorCoParticipacao"),
    col("Unit of Measure", "unidadeMedida"),
    col("Principal SPSADT Guide Number", "numeroGuiaSPSADTPrincipal"),
    col("Admission Type", "tipoInternacao"),
    col("Admission Regime", "regimeInternacao"),
    col("CID Diagnosis", "diagnosticoCID"),
    col("Billing Type", "tipoFaturamento"),
    col("Discharge Reason", "motivoSaida"),
    col("Executing CBO", "cboExecutante"),
    col("End-of-Period Date", "dataFimPeriodo"),
    col("Death Declaration", "declaracaoObito"),
    col("Birth Declaration", "declaracaoNascido"),
    ColumnSpec {
        name: AGE_COLUMN,
        tag: None,
    },
    col("Intermediary-Operator Registry", "registroANSOperadoraIntermediaria"),
    col(
        "Intermediary-Operator Care Type",
        "tipoAtendimentoOperadoraIntermediaria",
    ),
    col("Transaction Type", "tipoTransacao"),
    col("Batch Number", "numeroLote"),
    col("Batch Period", "competenciaLote"),
    col("Transaction Registration Date", "dataRegistroTransacao"),
    col("Transaction Registration Time", "horaRegistroTransacao"),
    col("Operator Registry", "registroANS"),
    col("Schema Version", "versaoPadrao"),
];

/// Look up a column by header name.
pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|spec| spec.name == name)
}

/// Look up the column bound to an XML local tag.
pub fn column_for_tag(tag: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|spec| spec.tag == Some(tag))
}

/// XML tag bound to a column header, if any.
pub fn tag_for_column(name: &str) -> Option<&'static str> {
    column(name).and_then(|spec| spec.tag)
}
