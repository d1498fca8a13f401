use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use derive_more::Display;

use crate::model::clock::parse_clock;

/// Time of day after which a login counts as late. A login exactly at the
/// cutoff is on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{:02}:{:02}", hour, minute)]
pub struct LateCutoff {
    hour: u32,
    minute: u32,
}

impl LateCutoff {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn is_late(&self, login: NaiveTime) -> bool {
        classify_late(login, self.hour, self.minute)
    }
}

impl FromStr for LateCutoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = parse_clock(s).map_err(|e| format!("expected HH:MM, got `{s}`: {e}"))?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }
}

fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Elapsed hours between login and logout, rounded to 2 decimals.
///
/// Returns `0.0` unless both times are present. There is no wrap across
/// midnight: a logout earlier than the login gives a negative value.
pub fn total_hours(login: Option<NaiveTime>, logout: Option<NaiveTime>) -> f64 {
    let (Some(login), Some(logout)) = (login, logout) else {
        return 0.0;
    };

    let minutes = minutes_since_midnight(logout) - minutes_since_midnight(login);
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

pub fn classify_late(login: NaiveTime, cutoff_hour: u32, cutoff_minute: u32) -> bool {
    login.hour() > cutoff_hour || (login.hour() == cutoff_hour && login.minute() > cutoff_minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_clock(s).unwrap()
    }

    #[test]
    fn full_day_with_half_hour() {
        assert_eq!(total_hours(Some(t("09:00")), Some(t("17:30"))), 8.5);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(total_hours(Some(t("09:05")), Some(t("17:30"))), 8.42);
        assert_eq!(total_hours(Some(t("09:00")), Some(t("09:01"))), 0.02);
        assert_eq!(total_hours(Some(t("12:00")), Some(t("12:00"))), 0.0);
    }

    #[test]
    fn missing_time_yields_zero() {
        assert_eq!(total_hours(Some(t("09:00")), None), 0.0);
        assert_eq!(total_hours(None, Some(t("17:00"))), 0.0);
        assert_eq!(total_hours(None, None), 0.0);
    }

    #[test]
    fn logout_before_login_is_negative() {
        assert_eq!(total_hours(Some(t("22:00")), Some(t("06:00"))), -16.0);
    }

    #[test]
    fn lateness_is_strictly_after_cutoff() {
        assert!(!classify_late(t("10:00"), 10, 0));
        assert!(classify_late(t("10:01"), 10, 0));
        assert!(!classify_late(t("09:59"), 10, 0));
        assert!(classify_late(t("11:00"), 10, 30));
        assert!(!classify_late(t("10:30"), 10, 30));
    }

    #[test]
    fn cutoff_parses_and_displays() {
        let cutoff: LateCutoff = "09:15".parse().unwrap();
        assert_eq!((cutoff.hour(), cutoff.minute()), (9, 15));
        assert_eq!(cutoff.to_string(), "09:15");
        assert!(cutoff.is_late(t("09:16")));
        assert!(!cutoff.is_late(t("09:15")));
        assert!("late".parse::<LateCutoff>().is_err());
        assert!(LateCutoff::new(24, 0).is_none());
    }
}
