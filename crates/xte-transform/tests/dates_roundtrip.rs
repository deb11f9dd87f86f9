//! Property test: display ↔ ISO conversion is lossless for valid dates.

use chrono::NaiveDate;
use proptest::prelude::*;

use xte_transform::{format_display, format_iso, reformat_iso_to_display, to_iso_string};

proptest! {
    #[test]
    fn display_and_iso_forms_round_trip(
        year in 1900i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        let display = format_display(date);
        let iso = format_iso(date);

        let iso_from_display = to_iso_string(&display);
        prop_assert_eq!(iso_from_display.as_deref(), Some(iso.as_str()));
        let display_from_iso = reformat_iso_to_display(&iso);
        prop_assert_eq!(display_from_iso.as_deref(), Some(display.as_str()));
    }
}
