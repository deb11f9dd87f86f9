//! TISS monitoring ingestion.
//!
//! - **xte_reader**: ISO-8859-1 XTE/XML documents → flat records, one per
//!   procedure (or per guide when it carries none)
//! - **csv_table**: `;`-delimited flat tables → the same record form, as the
//!   export pipeline's input

pub mod csv_table;
pub mod xte_reader;

pub use csv_table::{read_flat_csv, read_flat_csv_from_reader};
pub use xte_reader::{ImportResult, import_xte};
