use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Renders an ISO date (`2024-01-31`, `2024-01-31T08:00` or RFC 3339) as
/// `31/01/2024`. Empty input stays empty; anything unparsable is returned as is.
pub fn format_display_date(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.date_naive().format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format(DISPLAY_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return dt.date().format(DISPLAY_FORMAT).to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_display_date("2024-01-05"), "05/01/2024");
        assert_eq!(format_display_date("2024-01-05T08:30"), "05/01/2024");
        assert_eq!(format_display_date("2024-01-05T08:30:00+07:00"), "05/01/2024");
    }

    #[test]
    fn passes_through_what_it_cannot_parse() {
        assert_eq!(format_display_date(""), "");
        assert_eq!(format_display_date("   "), "");
        assert_eq!(format_display_date("next week"), "next week");
    }
}
