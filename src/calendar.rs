use chrono::{Datelike, Local, Months, NaiveDate};

/// Day-first formats accepted from form input in addition to ISO dates.
const DAY_FIRST_FORMATS: [&str; 2] = ["%d.%m.%Y", "%d/%m/%Y"];

/// Normalize a user-entered date to a calendar date.
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YYYY` and `DD/MM/YYYY`. Blank or malformed
/// input yields `None` so callers can treat the value as not recorded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Same month and day one year later.
///
/// Feb 29 lands on Feb 28 when the target year is not a leap year.
pub fn add_one_year(date: NaiveDate) -> Option<NaiveDate> {
    let target_year = date.year().checked_add(1)?;
    match date.with_year(target_year) {
        Some(next) => Some(next),
        None if date.month() == 2 && date.day() == 29 => {
            NaiveDate::from_ymd_opt(target_year, 2, 28)
        }
        None => None,
    }
}

/// Advance by whole months, clamping to the last day of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// ISO rendering used by flat records; absent dates become empty strings.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
