//! Persistence seams. The service layer only sees these traits; MySQL backs
//! them in production and [`memory`] backs them for `memory:` URLs and tests.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};

pub(crate) fn day_taken(employee_id: &str, date: NaiveDate) -> AppError {
    AppError::Conflict(format!("{employee_id} already has an attendance record for {date}"))
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// All records, absent-flagged ones included, in storage order.
    async fn list(&self) -> AppResult<Vec<AttendanceRecord>>;

    async fn get(&self, id: u64) -> AppResult<Option<AttendanceRecord>>;

    /// Fails with [`AppError::Conflict`] when the employee already has a
    /// `present` record on that date. The check and the write are atomic.
    async fn insert(&self, record: NewAttendance) -> AppResult<AttendanceRecord>;

    /// Returns `false` when no row has this id.
    async fn update_times(
        &self,
        id: u64,
        login_time: NaiveTime,
        logout_time: Option<NaiveTime>,
        total_hours: f64,
    ) -> AppResult<bool>;

    /// `remarks: None` keeps the stored remarks.
    async fn update_presence(&self, id: u64, is_actually_present: bool, remarks: Option<String>) -> AppResult<bool>;

    async fn set_status(&self, id: u64, status: AttendanceStatus) -> AppResult<bool>;

    async fn delete(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Employee>>;

    async fn get(&self, id: u64) -> AppResult<Option<Employee>>;

    async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<Employee>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Employee>>;

    async fn insert(&self, employee: NewEmployee) -> AppResult<Employee>;

    /// The updated employee, or `None` when the id is unknown.
    async fn update(&self, id: u64, changes: EmployeeChanges) -> AppResult<Option<Employee>>;

    /// The removed employee, or `None` when the id is unknown.
    async fn delete(&self, id: u64) -> AppResult<Option<Employee>>;
}
