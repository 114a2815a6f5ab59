use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Date-time layouts tried in order for the date column.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
];

/// Date-only layouts, interpreted at midnight. Month-first for slashed dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a date or date-time cell ("2024-01-05", "2024-01-05 16:24:00", ...).
/// Returns None for empty or unparseable strings.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Midnight timestamps render as a bare date, anything else with seconds.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// Parse an optional numeric cell ("" → Ok(None), "12.5" → Ok(Some(12.5))).
/// Non-finite values ("NaN", "inf") are rejected like any other garbage.
pub fn parse_opt_f64(s: &str) -> Result<Option<f64>, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("not a number: {:?}", trimmed)),
    }
}

/// Parse an optional text cell, mapping blank strings to None.
pub fn parse_opt_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_datetime("2024-01-05"), Some(dt("2024-01-05 00:00:00")));
        assert_eq!(parse_datetime(" 2024/01/05 "), Some(dt("2024-01-05 00:00:00")));
    }

    #[test]
    fn test_parse_datetime_variants() {
        assert_eq!(
            parse_datetime("2024-01-05 16:24:10"),
            Some(dt("2024-01-05 16:24:10"))
        );
        assert_eq!(
            parse_datetime("2024-01-05T16:24:10"),
            Some(dt("2024-01-05 16:24:10"))
        );
        assert_eq!(parse_datetime("05-01-2024 16:24"), Some(dt("2024-01-05 16:24:00")));
    }

    #[test]
    fn test_slashed_dates_are_month_first() {
        assert_eq!(parse_datetime("01/05/2024"), Some(dt("2024-01-05 00:00:00")));
    }

    #[test]
    fn test_parse_datetime_empty_or_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("   ").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(&dt("2024-01-05 00:00:00")), "2024-01-05");
        assert_eq!(
            format_datetime(&dt("2024-01-05 08:30:00")),
            "2024-01-05 08:30:00"
        );
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        for s in ["2024-02-29 00:00:00", "2024-02-29 23:59:59"] {
            let original = dt(s);
            assert_eq!(parse_datetime(&format_datetime(&original)), Some(original));
        }
    }

    #[test]
    fn test_parse_opt_f64() {
        assert_eq!(parse_opt_f64(""), Ok(None));
        assert_eq!(parse_opt_f64("  "), Ok(None));
        assert_eq!(parse_opt_f64("12.5"), Ok(Some(12.5)));
        assert_eq!(parse_opt_f64(" -3 "), Ok(Some(-3.0)));
        assert!(parse_opt_f64("abc").is_err());
        assert!(parse_opt_f64("NaN").is_err());
        assert!(parse_opt_f64("inf").is_err());
    }

    #[test]
    fn test_parse_opt_text() {
        assert_eq!(parse_opt_text("  S1 "), Some("S1".to_string()));
        assert_eq!(parse_opt_text(""), None);
    }
}
