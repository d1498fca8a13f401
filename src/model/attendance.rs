use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::clock::{hhmm, lenient_date, option_hhmm};

pub const DEFAULT_LOCATION: &str = "Office";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeId": "EMP001",
    "employeeName": "John Doe",
    "date": "2024-01-15",
    "loginTime": "09:05",
    "logoutTime": "17:30",
    "totalHours": 8.42,
    "isLate": false,
    "location": "Office",
    "isActuallyPresent": true,
    "remarks": null,
    "status": "present"
}))]
pub struct AttendanceRecord {
    pub id: u64,

    pub employee_id: String,

    /// Current employee name when the employee is known, else the copy
    /// captured at entry time.
    pub employee_name: String,

    #[serde(with = "lenient_date")]
    #[schema(value_type = String, format = "date", example = "2024-01-15")]
    pub date: NaiveDate,

    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:05")]
    pub login_time: NaiveTime,

    #[serde(default, with = "option_hhmm")]
    #[schema(value_type = Option<String>, example = "17:30")]
    pub logout_time: Option<NaiveTime>,

    pub total_hours: f64,

    pub is_late: bool,

    pub location: String,

    #[serde(default)]
    pub is_actually_present: Option<bool>,

    #[serde(default)]
    pub remarks: Option<String>,

    #[serde(default)]
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// An unset override counts as present.
    pub fn is_present(&self) -> bool {
        self.is_actually_present != Some(false)
    }

    pub fn location_or_default(&self) -> &str {
        let location = self.location.trim();
        if location.is_empty() {
            DEFAULT_LOCATION
        } else {
            location
        }
    }
}

/// A fully derived record waiting for the store to assign its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub login_time: NaiveTime,
    pub logout_time: Option<NaiveTime>,
    pub total_hours: f64,
    pub is_late: bool,
    pub location: String,
    pub is_actually_present: Option<bool>,
    pub remarks: Option<String>,
}

impl NewAttendance {
    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            date: self.date,
            login_time: self.login_time,
            logout_time: self.logout_time,
            total_hours: self.total_hours,
            is_late: self.is_late,
            location: self.location,
            is_actually_present: self.is_actually_present,
            remarks: self.remarks,
            status: AttendanceStatus::Present,
        }
    }
}
