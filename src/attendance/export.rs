use chrono::NaiveDate;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{AppError, AppResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::clock::{DATE_FORMAT, format_clock};

pub const NOT_LOGGED_OUT: &str = "Not logged out";

const FULL_HEADER: [&str; 9] = [
    "Employee",
    "Date",
    "Login Time",
    "Logout Time",
    "Total Hours",
    "Late",
    "Location",
    "Actually Present",
    "Remarks",
];

const LATE_HEADER: [&str; 5] = ["Employee", "Date", "Login Time", "Location", "Actually Present"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    Full,
    Late,
}

impl ReportKind {
    pub fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::Full => "attendance_report",
            ReportKind::Late => "late_login_report",
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.file_stem(), date.format(DATE_FORMAT))
    }

    pub fn render(&self, records: &[AttendanceRecord]) -> AppResult<String> {
        match self {
            ReportKind::Full => export_full(records),
            ReportKind::Late => export_late(records),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn format_hours(hours: f64) -> String {
    if hours == 0.0 || hours.is_nan() {
        "0".to_string()
    } else {
        hours.to_string()
    }
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("flushing CSV buffer: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {e}")))
}

/// Every record, one row each, under the full header.
pub fn export_full(records: &[AttendanceRecord]) -> AppResult<String> {
    let mut writer = writer();
    writer.write_record(FULL_HEADER)?;

    for record in records {
        let date = record.date.format(DATE_FORMAT).to_string();
        let login = format_clock(&record.login_time);
        let logout = record.logout_time.map(|t| format_clock(&t));
        let hours = format_hours(record.total_hours);

        writer.write_record([
            record.employee_name.as_str(),
            date.as_str(),
            login.as_str(),
            logout.as_deref().unwrap_or(NOT_LOGGED_OUT),
            hours.as_str(),
            yes_no(record.is_late),
            record.location_or_default(),
            yes_no(record.is_present()),
            record.remarks.as_deref().unwrap_or(""),
        ])?;
    }

    finish(writer)
}

/// Only late records, with the narrower column set.
pub fn export_late(records: &[AttendanceRecord]) -> AppResult<String> {
    let mut writer = writer();
    writer.write_record(LATE_HEADER)?;

    for record in records.iter().filter(|r| r.is_late) {
        let date = record.date.format(DATE_FORMAT).to_string();
        let login = format_clock(&record.login_time);

        writer.write_record([
            record.employee_name.as_str(),
            date.as_str(),
            login.as_str(),
            record.location_or_default(),
            yes_no(record.is_present()),
        ])?;
    }

    finish(writer)
}
