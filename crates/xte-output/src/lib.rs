//! TISS monitoring output generation.
//!
//! - **xte_writer**: flat records → one pretty-printed ISO-8859-1 XML
//!   document per origin, with the MD5 content digest in the epilogue
//! - **csv_out**: flat records → `;`-delimited CSV bytes
//! - **hash**: the epilogue digest primitive

pub mod csv_out;
pub mod hash;
pub mod xte_writer;

pub use csv_out::write_flat_csv;
pub use hash::md5_hex;
pub use xte_writer::{ANS_NAMESPACE, ExportOptions, export_xte, sanitize_origin};
