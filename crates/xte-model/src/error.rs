use thiserror::Error;

/// Error taxonomy for the XTE conversion pipelines.
///
/// Only structural failures reach the caller: malformed XML on import and a
/// missing mandatory column on export. Per-field problems (unparseable dates,
/// odd sex codes, absent optional columns) are recovered locally and never
/// surface as an `XteError`.
#[derive(Debug, Error)]
pub enum XteError {
    #[error("malformed XML: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
    #[error("character encoding: {0}")]
    Encoding(String),
    #[error("XML serialization: {0}")]
    Serialize(String),
    #[error("csv error: {0}")]
    Csv(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XteError>;
