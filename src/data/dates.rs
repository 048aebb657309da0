//! Month-granularity date helpers
//!
//! Every date in the pipeline is normalised to the first day of its month.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Display format for forecast indices ("Jan 2025")
pub const MONTH_LABEL_FORMAT: &str = "%b %Y";

/// Parse a spreadsheet date cell into the first day of its month.
///
/// Day-first forms are tried before ISO forms, matching how the source
/// workbooks were exported.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(month_start(date));
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(month_start(ts.date()));
        }
    }

    // "2024-12"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }

    parse_month_label(raw)
}

/// Parse a "Jan 2025" style label
pub fn parse_month_label(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01 {}", raw.trim()), "%d %b %Y").ok()
}

/// Format a month as "Jan 2025"
pub fn format_month(date: NaiveDate) -> String {
    date.format(MONTH_LABEL_FORMAT).to_string()
}

/// Parse a calendar-year cell. Spreadsheet exports sometimes write "2019.0";
/// anything with a fractional part is rejected rather than truncated.
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok().filter(|y| y.is_finite() && y.fract() == 0.0)?;
    if value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value as i32)
}

/// 1 January of `year`, used to key annual rows
pub fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a month forward by `n` calendar months
pub fn add_months(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_first() {
        // 01/12/2024 is December, not January
        assert_eq!(parse_month("01/12/2024"), Some(ymd(2024, 12, 1)));
        assert_eq!(parse_month("15/03/2023"), Some(ymd(2023, 3, 1)));
    }

    #[test]
    fn test_parse_iso_and_partial() {
        assert_eq!(parse_month("2024-07-31"), Some(ymd(2024, 7, 1)));
        assert_eq!(parse_month("2024-07-01 00:00:00"), Some(ymd(2024, 7, 1)));
        assert_eq!(parse_month("2024-07"), Some(ymd(2024, 7, 1)));
        assert_eq!(parse_month("Jul 2024"), Some(ymd(2024, 7, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_month(""), None);
        assert_eq!(parse_month("not a date"), None);
        assert_eq!(parse_month("32/13/2024"), None);
    }

    #[test]
    fn test_parse_year_rejects_fractions() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year(" 2019.0 "), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("1e12"), None);
        assert_eq!(parse_year("NaN"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_add_months_crosses_year() {
        assert_eq!(add_months(ymd(2024, 12, 1), 1), Some(ymd(2025, 1, 1)));
        assert_eq!(add_months(ymd(2024, 11, 20), 14), Some(ymd(2026, 1, 1)));
    }

    #[test]
    fn test_month_label_round_trip() {
        let date = ymd(2025, 3, 1);
        assert_eq!(format_month(date), "Mar 2025");
        assert_eq!(parse_month_label("Mar 2025"), Some(date));
    }
}
