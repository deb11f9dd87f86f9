//! Identifier normalization for the guide/operator/reimbursement numbers.

/// Normalize a digit-only identifier through an integer round-trip, stripping
/// leading zeros (`"000"` becomes `"0"`). Any other shape (signs, decimal
/// points, letters, blanks) passes through untouched.
///
/// This mirrors the long-standing spreadsheet-compatibility behavior and is
/// deliberately kept even though it destroys legitimately zero-padded TISS
/// identifiers; see DESIGN.md.
pub fn normalize_identifier(value: &str) -> String {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return value.to_string();
    }
    let stripped = value.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}
