//! Field-level normalization shared by the import and export pipelines.
//!
//! - **dates**: canonical display (`DD/MM/YYYY`) and wire (`YYYY-MM-DD`)
//!   forms, lenient day-first parsing, Excel-serial fallback, age derivation
//! - **idents**: digit-only identifier normalization

pub mod dates;
pub mod idents;

pub use dates::{
    age_at_realization, format_display, format_iso, parse_lenient, reformat_iso_to_display,
    to_iso_string,
};
pub use idents::normalize_identifier;
