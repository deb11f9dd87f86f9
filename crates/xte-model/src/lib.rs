pub mod error;
pub mod latin1;
pub mod procedure;
pub mod schema;
pub mod table;

pub use error::{Result, XteError};
pub use latin1::{decode_iso_8859_1, encode_iso_8859_1};
pub use procedure::ProcedureIdent;
pub use schema::{
    AGE_COLUMN, COLUMNS, ColumnSpec, GROUP_KEY_COLUMNS, IDENTIFIER_COLUMNS, ORIGIN_COLUMN,
    SUPPLIER_CNPJ_COLUMN, column, column_for_tag, tag_for_column,
};
pub use table::{CellValue, Record, RecordTable};
