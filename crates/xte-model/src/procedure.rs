/// Procedure identification inside `identProcedimento`/`Procedimento`.
///
/// The schema admits either a procedure group or a procedure code, never
/// both. The choice is made at construction time; the group wins when both
/// fields carry a value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProcedureIdent {
    Group(String),
    Code(String),
}

impl ProcedureIdent {
    /// Build from the two flat fields, `None` when neither holds a value.
    pub fn from_fields(group: Option<&str>, code: Option<&str>) -> Option<Self> {
        fn non_blank(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
        }
        if let Some(group) = non_blank(group) {
            return Some(ProcedureIdent::Group(group.to_string()));
        }
        non_blank(code).map(|code| ProcedureIdent::Code(code.to_string()))
    }

    /// XML local tag carrying this identification.
    pub fn tag(&self) -> &'static str {
        match self {
            ProcedureIdent::Group(_) => "grupoProcedimento",
            ProcedureIdent::Code(_) => "codigoProcedimento",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ProcedureIdent::Group(value) | ProcedureIdent::Code(value) => value,
        }
    }
}
