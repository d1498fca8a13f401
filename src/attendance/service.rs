use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::metrics::{self, LateCutoff};
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DEFAULT_LOCATION, NewAttendance};
use crate::model::clock::{option_hhmm, option_lenient_date};
use crate::store::AttendanceStore;
use crate::utils::employee_directory::EmployeeDirectory;

/// What "mark absent" does to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AbsenceMode {
    /// Hard delete.
    #[default]
    Delete,
    /// Keep the row with `status = absent`, hidden from listings.
    Flag,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    /// Case-insensitive substring of the employee name
    #[param(example = "john")]
    pub employee: Option<String>,

    /// Inclusive lower bound (YYYY-MM-DD)
    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper bound (YYYY-MM-DD)
    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[param(value_type = Option<String>, example = "2024-01-31")]
    pub date_to: Option<NaiveDate>,
}

impl AttendanceFilter {
    fn matches(&self, record: &AttendanceRecord, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            if !record.employee_name.to_lowercase().contains(needle) {
                return false;
            }
        }
        if self.date_from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| record.date > to) {
            return false;
        }
        true
    }
}

/// Admin-entered attendance. Fields are optional at the type level so a
/// missing value surfaces as a validation error instead of a parse error.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "employeeId": "EMP001",
    "employeeName": "John Doe",
    "date": "2024-01-15",
    "loginTime": "09:05",
    "logoutTime": "17:30",
    "location": "Office"
}))]
pub struct ManualEntry {
    #[serde(default)]
    pub employee_id: Option<String>,

    #[serde(default)]
    pub employee_name: Option<String>,

    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[schema(value_type = String, format = "date")]
    pub date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "option_hhmm::deserialize")]
    #[schema(value_type = String)]
    pub login_time: Option<NaiveTime>,

    #[serde(default, deserialize_with = "option_hhmm::deserialize")]
    #[schema(value_type = Option<String>)]
    pub logout_time: Option<NaiveTime>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub is_actually_present: Option<bool>,

    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub login_count: usize,
    pub unique_location_count: usize,
    pub on_time_count: usize,
    pub not_present_count: usize,
    pub late_records: Vec<AttendanceRecord>,
}

const REQUIRED_FIELDS: &str = "employeeName, date and loginTime are required";

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Attendance record {id} not found"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Synthetic id for manual entries that name no employee. Unique only to
/// the millisecond.
fn generated_employee_id() -> String {
    format!("MAN{}", Utc::now().timestamp_millis())
}

/// Creates, corrects, removes and queries attendance records. Derived
/// fields (`totalHours`, `isLate`) are computed here and nowhere else.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    directory: EmployeeDirectory,
    cutoff: LateCutoff,
    absence_mode: AbsenceMode,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        directory: EmployeeDirectory,
        cutoff: LateCutoff,
        absence_mode: AbsenceMode,
    ) -> Self {
        Self {
            store,
            directory,
            cutoff,
            absence_mode,
        }
    }

    pub fn cutoff(&self) -> LateCutoff {
        self.cutoff
    }

    async fn visible_records(&self) -> AppResult<Vec<AttendanceRecord>> {
        let mut records = self.store.list().await?;
        records.retain(|r| r.status == AttendanceStatus::Present);
        self.directory.resolve_names(&mut records).await?;
        Ok(records)
    }

    async fn find_visible(&self, id: u64) -> AppResult<AttendanceRecord> {
        match self.store.get(id).await? {
            Some(record) if record.status == AttendanceStatus::Present => Ok(record),
            _ => Err(not_found(id)),
        }
    }

    async fn with_resolved_name(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord> {
        let mut one = [record];
        self.directory.resolve_names(&mut one).await?;
        let [record] = one;
        Ok(record)
    }

    /// Records matching `filter`, in storage order.
    #[instrument(skip(self))]
    pub async fn list_records(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        let needle = filter
            .employee
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut records = self.visible_records().await?;
        records.retain(|r| filter.matches(r, needle.as_deref()));
        Ok(records)
    }

    #[instrument(skip(self, entry), fields(employee_id = ?entry.employee_id))]
    pub async fn create_manual_record(&self, entry: ManualEntry) -> AppResult<AttendanceRecord> {
        let employee_name = non_blank(entry.employee_name).ok_or_else(|| AppError::Validation(REQUIRED_FIELDS.into()))?;
        let date = entry.date.ok_or_else(|| AppError::Validation(REQUIRED_FIELDS.into()))?;
        let login_time = entry
            .login_time
            .ok_or_else(|| AppError::Validation(REQUIRED_FIELDS.into()))?;

        let employee_id = non_blank(entry.employee_id).unwrap_or_else(generated_employee_id);

        let record = NewAttendance {
            employee_id,
            employee_name,
            date,
            login_time,
            logout_time: entry.logout_time,
            total_hours: metrics::total_hours(Some(login_time), entry.logout_time),
            is_late: self.cutoff.is_late(login_time),
            location: non_blank(entry.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            is_actually_present: entry.is_actually_present,
            remarks: non_blank(entry.remarks),
        };

        // the store rejects a second present record for the same day
        let saved = self.store.insert(record).await?;
        info!(
            id = saved.id,
            employee_id = %saved.employee_id,
            is_late = saved.is_late,
            total_hours = saved.total_hours,
            "Manual attendance recorded"
        );

        self.with_resolved_name(saved).await
    }

    /// Corrects login/logout and recomputes `totalHours`. `isLate` keeps the
    /// value computed at creation.
    #[instrument(skip(self))]
    pub async fn update_times(
        &self,
        id: u64,
        login_time: Option<NaiveTime>,
        logout_time: Option<NaiveTime>,
    ) -> AppResult<AttendanceRecord> {
        let mut record = self.find_visible(id).await?;
        let login_time = login_time.ok_or_else(|| AppError::Validation("loginTime is required".into()))?;
        let total_hours = metrics::total_hours(Some(login_time), logout_time);

        // last writer wins
        if !self
            .store
            .update_times(id, login_time, logout_time, total_hours)
            .await?
        {
            return Err(not_found(id));
        }

        record.login_time = login_time;
        record.logout_time = logout_time;
        record.total_hours = total_hours;
        info!(id, total_hours, "Attendance times corrected");

        self.with_resolved_name(record).await
    }

    #[instrument(skip(self, remarks))]
    pub async fn set_presence(
        &self,
        id: u64,
        is_actually_present: bool,
        remarks: Option<String>,
    ) -> AppResult<AttendanceRecord> {
        let mut record = self.find_visible(id).await?;
        let remarks = non_blank(remarks);

        if !self
            .store
            .update_presence(id, is_actually_present, remarks.clone())
            .await?
        {
            return Err(not_found(id));
        }

        record.is_actually_present = Some(is_actually_present);
        if remarks.is_some() {
            record.remarks = remarks;
        }

        self.with_resolved_name(record).await
    }

    #[instrument(skip(self))]
    pub async fn mark_absent(&self, id: u64) -> AppResult<()> {
        // rows already flagged absent are gone for every operation
        self.find_visible(id).await?;

        match self.absence_mode {
            AbsenceMode::Delete => {
                if !self.store.delete(id).await? {
                    return Err(not_found(id));
                }
            }
            AbsenceMode::Flag => {
                self.store.update_presence(id, false, None).await?;
                if !self.store.set_status(id, AttendanceStatus::Absent).await? {
                    return Err(not_found(id));
                }
            }
        }

        info!(id, mode = %self.absence_mode, "Attendance record marked absent");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self, date: NaiveDate) -> AppResult<DashboardSummary> {
        let mut records = self.visible_records().await?;
        records.retain(|r| r.date == date);

        let unique_location_count = records
            .iter()
            .map(AttendanceRecord::location_or_default)
            .collect::<HashSet<_>>()
            .len();
        let on_time_count = records.iter().filter(|r| !r.is_late).count();
        let not_present_count = records.iter().filter(|r| !r.is_present()).count();
        let login_count = records.len();
        let late_records = records.into_iter().filter(|r| r.is_late).collect();

        Ok(DashboardSummary {
            date,
            login_count,
            unique_location_count,
            on_time_count,
            not_present_count,
            late_records,
        })
    }
}
