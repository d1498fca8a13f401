//! Wire formats for wall-clock times (`HH:MM`) and calendar dates.
//!
//! Dates arriving from clients sometimes carry a time-of-day suffix
//! (`2024-01-05T00:00:00.000Z`); those are reduced to their calendar date
//! rather than compared as strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer, de::Error};

pub const CLOCK_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `HH:MM`, tolerating a trailing `:SS`.
pub fn parse_clock(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
}

/// Parses `YYYY-MM-DD`, or an ISO timestamp whose date component is kept.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
}

pub fn format_clock(time: &NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_clock(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_clock(&raw).map_err(|e| D::Error::custom(format!("invalid time `{raw}`: {e}")))
    }
}

/// `null`, a missing field, or `""` all mean "no time".
pub mod option_hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&format_clock(t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_clock(&raw)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid time `{raw}`: {e}"))),
            _ => Ok(None),
        }
    }
}

pub mod lenient_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).map_err(|e| D::Error::custom(format!("invalid date `{raw}`: {e}")))
    }
}

pub mod option_lenient_date {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_date(&raw)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid date `{raw}`: {e}"))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Probe {
        #[serde(with = "hhmm")]
        login: NaiveTime,
        #[serde(default, with = "option_hhmm")]
        logout: Option<NaiveTime>,
        #[serde(with = "lenient_date")]
        date: NaiveDate,
    }

    #[test]
    fn empty_logout_is_absent() {
        let probe: Probe =
            serde_json::from_str(r#"{"login":"09:05","logout":"","date":"2024-01-05"}"#).unwrap();
        assert_eq!(probe.login, NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert!(probe.logout.is_none());

        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["login"], "09:05");
        assert!(json["logout"].is_null());
        assert_eq!(json["date"], "2024-01-05");
    }

    #[test]
    fn timestamp_suffix_is_dropped_from_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_date("2024-01-05T00:00:00.000Z").unwrap(), date);
        assert_eq!(parse_date("2024-01-05T18:30:00").unwrap(), date);
        assert_eq!(parse_date(" 2024-01-05 ").unwrap(), date);
        assert!(parse_date("05/01/2024").is_err());
    }

    #[test]
    fn clock_accepts_seconds_and_rejects_garbage() {
        assert_eq!(
            parse_clock("17:30:00").unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap()
        );
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("noon").is_err());
    }
}
