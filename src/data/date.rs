//! Spoken rendering of the source site's "last updated" stamp
//!
//! The site prints timestamps as `DD/MM/YY HH:MM AM|PM` in Buenos Aires local
//! time. The IVR only reads back the day and month, in Spanish.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Locale};
use regex::Regex;
use thiserror::Error;

use super::SpokenTimestamp;

/// America/Argentina/Buenos_Aires has no DST, so a fixed offset is exact
const BUENOS_AIRES_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Errors that can occur when normalizing a timestamp
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    /// Input does not contain a `DD/MM/YY HH:MM AM|PM` stamp, or the stamp
    /// does not name a real calendar time
    #[error("Unrecognized date format: '{0}'")]
    Malformed(String),
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]{2})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2}) (AM|PM)")
            .expect("timestamp pattern is valid")
    })
}

fn buenos_aires() -> FixedOffset {
    FixedOffset::east_opt(BUENOS_AIRES_UTC_OFFSET_SECS).expect("UTC-03:00 is a valid offset")
}

/// Converts a 12-hour clock reading to 24-hour
///
/// 12 AM is midnight, 12 PM is noon, every other PM hour moves forward by 12.
pub fn to_24_hour(hour: u32, is_pm: bool) -> u32 {
    match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// Parses a site timestamp into an instant at UTC-03:00
///
/// # Arguments
/// * `raw` - Text containing a stamp such as `15/03/24 10:30 PM`
///
/// # Returns
/// * `Ok(DateTime<FixedOffset>)` - The instant the stamp names
/// * `Err(DateError::Malformed)` - If no stamp is found or it is not a real time
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let malformed = || DateError::Malformed(raw.to_string());
    let caps = timestamp_pattern().captures(raw).ok_or_else(malformed)?;

    let day = &caps[1];
    let month = &caps[2];
    let year = format!("20{}", &caps[3]);
    let hour: u32 = caps[4].parse().map_err(|_| malformed())?;
    let minute = &caps[5];
    let hour = to_24_hour(hour, &caps[6] == "PM");

    let iso = format!("{year}-{month}-{day}T{hour:02}:{minute}:00-03:00");
    DateTime::parse_from_rfc3339(&iso).map_err(|_| malformed())
}

/// Renders a site timestamp as "<day> de <month>" in Spanish
///
/// # Returns
/// * `Ok(SpokenTimestamp)` - e.g. "15 de marzo" for `15/03/24 10:30 AM`
/// * `Err(DateError::Malformed)` - If the input is not a recognizable stamp
pub fn normalize_timestamp(raw: &str) -> Result<SpokenTimestamp, DateError> {
    let local = parse_timestamp(raw)?.with_timezone(&buenos_aires());
    Ok(SpokenTimestamp::from(
        local.format_localized("%-d de %B", Locale::es_ES).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_normalize_morning_stamp() {
        let spoken = normalize_timestamp("15/03/24 10:30 AM").expect("valid stamp");
        assert_eq!(spoken.as_str(), "15 de marzo");
    }

    #[test]
    fn test_normalize_drops_day_padding() {
        let spoken = normalize_timestamp("01/01/25 09:00 AM").expect("valid stamp");
        assert_eq!(spoken.as_str(), "1 de enero");
    }

    #[test]
    fn test_normalize_late_evening_stays_on_same_day() {
        let spoken = normalize_timestamp("31/12/24 11:59 PM").expect("valid stamp");
        assert_eq!(spoken.as_str(), "31 de diciembre");
    }

    #[test]
    fn test_normalize_finds_stamp_inside_text() {
        let spoken =
            normalize_timestamp("Actualizado 07/08/24 03:15 PM").expect("embedded stamp");
        assert_eq!(spoken.as_str(), "7 de agosto");
    }

    #[test]
    fn test_normalize_ignores_non_ascii_digits() {
        // Arabic-Indic "15" is skipped; the ASCII stamp after it is used
        let spoken = normalize_timestamp("١٥/03/24 10:30 AM 16/03/24 10:30 AM")
            .expect("ascii stamp");
        assert_eq!(spoken.as_str(), "16 de marzo");
    }

    #[test]
    fn test_hour_conversion_table() {
        let cases = [
            ("15/03/24 12:05 AM", 0, 5),
            ("15/03/24 12:05 PM", 12, 5),
            ("15/03/24 03:05 PM", 15, 5),
            ("15/03/24 03:05 AM", 3, 5),
            ("15/03/24 01:00 PM", 13, 0),
            ("15/03/24 11:30 PM", 23, 30),
        ];

        for (raw, expected_hour, expected_minute) in cases {
            let instant = parse_timestamp(raw).expect("valid stamp");
            assert_eq!(instant.hour(), expected_hour, "hour for {raw}");
            assert_eq!(instant.minute(), expected_minute, "minute for {raw}");
        }
    }

    #[test]
    fn test_to_24_hour() {
        assert_eq!(to_24_hour(12, false), 0);
        assert_eq!(to_24_hour(12, true), 12);
        assert_eq!(to_24_hour(3, true), 15);
        assert_eq!(to_24_hour(3, false), 3);
        assert_eq!(to_24_hour(9, true), 21);
    }

    #[test]
    fn test_parse_timestamp_keeps_buenos_aires_offset() {
        let instant = parse_timestamp("15/03/24 10:30 AM").expect("valid stamp");
        assert_eq!(instant.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(instant.to_rfc3339(), "2024-03-15T10:30:00-03:00");
    }

    #[test]
    fn test_normalize_rejects_unrecognized_formats() {
        for raw in ["", "2024-03-15 10:30", "15/03/2024 10:30 AM", "15/03/24 10:30", "hoy"] {
            let result = normalize_timestamp(raw);
            assert_eq!(result, Err(DateError::Malformed(raw.to_string())), "input {raw:?}");
        }
    }

    #[test]
    fn test_normalize_rejects_impossible_dates() {
        assert!(normalize_timestamp("31/02/24 10:00 AM").is_err());
        assert!(normalize_timestamp("15/13/24 10:00 AM").is_err());
        // 13 PM becomes hour 25
        assert!(normalize_timestamp("15/03/24 13:00 PM").is_err());
    }

    #[test]
    fn test_malformed_error_message() {
        let err = normalize_timestamp("ayer").unwrap_err();
        assert!(err.to_string().contains("Unrecognized date format"));
        assert!(err.to_string().contains("ayer"));
    }
}
