use chrono::{DateTime, Days, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Day 0 of the spreadsheet serial date system (1900 system with the
/// Lotus leap-year bug already folded in).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial of 9999-12-31, the last date a spreadsheet can hold.
pub const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Accepts ISO dates first, then day-first, then month-first.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    const FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excel_serials_convert() {
        assert_eq!(
            from_excel_serial(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(from_excel_serial(0.0), None);
        assert_eq!(from_excel_serial(f64::NAN), None);
    }

    #[test]
    fn out_of_range_serials_are_rejected() {
        assert_eq!(
            from_excel_serial(MAX_EXCEL_SERIAL),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(from_excel_serial(MAX_EXCEL_SERIAL + 1.0), None);
        assert_eq!(from_excel_serial(1e15), None);
        assert_eq!(from_excel_serial(f64::INFINITY), None);
        assert_eq!(from_excel_serial(-5.0), None);
    }

    #[test]
    fn flexible_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_flexible_date("2025-03-14"), expected);
        assert_eq!(parse_flexible_date("14/03/2025"), expected);
        assert_eq!(parse_flexible_date("14-03-2025"), expected);
        assert_eq!(parse_flexible_date("03/14/2025"), expected);
        assert_eq!(parse_flexible_date("March 14"), None);
    }
}
