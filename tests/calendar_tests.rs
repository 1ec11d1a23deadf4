use chrono::NaiveDate;
use health_records::calendar::{add_months, add_one_year, format_date, parse_date};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn parse_date_accepts_iso_and_day_first_forms() {
    assert_eq!(parse_date("2025-03-07"), Some(d(2025, 3, 7)));
    assert_eq!(parse_date("07.03.2025"), Some(d(2025, 3, 7)));
    assert_eq!(parse_date("07/03/2025"), Some(d(2025, 3, 7)));
    assert_eq!(parse_date("  2025-03-07 "), Some(d(2025, 3, 7)));
}

#[test]
fn parse_date_treats_garbage_as_absent() {
    assert_eq!(parse_date(""), None);
    assert_eq!(parse_date("   "), None);
    assert_eq!(parse_date("yesterday"), None);
    assert_eq!(parse_date("2023-02-29"), None);
    assert_eq!(parse_date("31.04.2025"), None);
}

#[test]
fn add_one_year_keeps_month_and_day() {
    assert_eq!(add_one_year(d(2025, 3, 7)), Some(d(2026, 3, 7)));
    assert_eq!(add_one_year(d(2024, 12, 31)), Some(d(2025, 12, 31)));
}

#[test]
fn add_one_year_moves_leap_day_to_feb_28() {
    assert_eq!(add_one_year(d(2024, 2, 29)), Some(d(2025, 2, 28)));
    assert_eq!(add_one_year(d(2000, 2, 29)), Some(d(2001, 2, 28)));
}

#[test]
fn add_months_clamps_to_month_end() {
    assert_eq!(add_months(d(2025, 1, 31), 1), Some(d(2025, 2, 28)));
    assert_eq!(add_months(d(2024, 8, 31), 6), Some(d(2025, 2, 28)));
    assert_eq!(add_months(d(2025, 5, 10), 12), Some(d(2026, 5, 10)));
}

#[test]
fn format_date_renders_iso_or_empty() {
    assert_eq!(format_date(Some(d(2025, 1, 2))), "2025-01-02");
    assert_eq!(format_date(None), "");
}
