//! Some utility functions

use chrono::NaiveDate;

use crate::error::Error;

/// Keep only the calendar date of a timestamp such as `2024-01-01T13:45:00.000Z`.
///
/// Time of day and time zone are discarded, they are never converted.
pub fn date_part(timestamp: &str) -> Result<NaiveDate, Error> {
    let date = timestamp.split('T').next().unwrap_or("").trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|err| Error::InvalidData(format!("'{}' is not a valid date: {}", timestamp, err)))
}

/// Same as [`date_part`], but an absent or empty value is no date at all
pub fn optional_date_part(timestamp: Option<&str>) -> Result<Option<NaiveDate>, Error> {
    match timestamp {
        None => Ok(None),
        Some(t) if t.trim().is_empty() => Ok(None),
        Some(t) => date_part(t).map(Some),
    }
}

/// Shorten a text to at most `max` characters, ending it with an ellipsis when it has been shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Make a (possibly long, multi-line) server reply fit in a single error line
pub fn one_line(message: &str) -> String {
    truncate(&message.replace(['\n', '\r'], " "), 240)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_part_truncates_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_part("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(date_part("2024-01-01T23:59:59.999-08:00").unwrap(), expected);
        assert_eq!(date_part("2024-01-01").unwrap(), expected);
    }

    #[test]
    fn malformed_dates_are_invalid_data() {
        assert!(matches!(date_part("tomorrow"), Err(Error::InvalidData(_))));
        assert!(matches!(date_part("2024-13-01"), Err(Error::InvalidData(_))));
    }

    #[test]
    fn empty_dates_are_absent() {
        assert_eq!(optional_date_part(None).unwrap(), None);
        assert_eq!(optional_date_part(Some("")).unwrap(), None);
        assert!(optional_date_part(Some("2023-05-06T10:00:00Z")).unwrap().is_some());
    }

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long title", 8), "a rathe…");
        assert_eq!(one_line("line 1\nline 2"), "line 1 line 2");
    }
}
