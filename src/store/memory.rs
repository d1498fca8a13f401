use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveTime;

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::store::{AttendanceStore, EmployeeStore, day_taken};

/// Vec-backed table keeping insertion order, with store-assigned ids.
struct Table<T> {
    rows: RwLock<Vec<T>>,
    next_id: AtomicU64,
    name: &'static str,
}

impl<T> Table<T> {
    fn new(name: &'static str) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            name,
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Vec<T>>> {
        self.rows
            .read()
            .map_err(|_| AppError::Internal(format!("{} table lock poisoned", self.name)))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Vec<T>>> {
        self.rows
            .write()
            .map_err(|_| AppError::Internal(format!("{} table lock poisoned", self.name)))
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

pub struct MemoryAttendanceStore {
    table: Table<AttendanceRecord>,
}

impl Default for MemoryAttendanceStore {
    fn default() -> Self {
        Self {
            table: Table::new("attendance"),
        }
    }
}

impl MemoryAttendanceStore {
    fn modify(&self, id: u64, change: impl FnOnce(&mut AttendanceRecord)) -> AppResult<bool> {
        let mut rows = self.table.write()?;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                change(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn list(&self) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self.table.read()?.clone())
    }

    async fn get(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.table.read()?.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, record: NewAttendance) -> AppResult<AttendanceRecord> {
        let mut rows = self.table.write()?;
        if rows
            .iter()
            .any(|r| r.employee_id == record.employee_id && r.date == record.date && r.status == AttendanceStatus::Present)
        {
            return Err(day_taken(&record.employee_id, record.date));
        }

        let record = record.into_record(self.table.allocate_id());
        rows.push(record.clone());
        Ok(record)
    }

    async fn update_times(
        &self,
        id: u64,
        login_time: NaiveTime,
        logout_time: Option<NaiveTime>,
        total_hours: f64,
    ) -> AppResult<bool> {
        self.modify(id, |r| {
            r.login_time = login_time;
            r.logout_time = logout_time;
            r.total_hours = total_hours;
        })
    }

    async fn update_presence(&self, id: u64, is_actually_present: bool, remarks: Option<String>) -> AppResult<bool> {
        self.modify(id, |r| {
            r.is_actually_present = Some(is_actually_present);
            if remarks.is_some() {
                r.remarks = remarks;
            }
        })
    }

    async fn set_status(&self, id: u64, status: AttendanceStatus) -> AppResult<bool> {
        self.modify(id, |r| r.status = status)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let mut rows = self.table.write()?;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

pub struct MemoryEmployeeStore {
    table: Table<Employee>,
}

impl Default for MemoryEmployeeStore {
    fn default() -> Self {
        Self {
            table: Table::new("employees"),
        }
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self) -> AppResult<Vec<Employee>> {
        Ok(self.table.read()?.clone())
    }

    async fn get(&self, id: u64) -> AppResult<Option<Employee>> {
        Ok(self.table.read()?.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<Employee>> {
        Ok(self.table.read()?.iter().find(|e| e.employee_id == employee_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Employee>> {
        Ok(self
            .table
            .read()?
            .iter()
            .find(|e| e.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn insert(&self, employee: NewEmployee) -> AppResult<Employee> {
        let mut rows = self.table.write()?;
        if rows
            .iter()
            .any(|e| e.username.eq_ignore_ascii_case(&employee.username) || e.employee_id == employee.employee_id)
        {
            return Err(AppError::Conflict("Employee already exists".into()));
        }

        let employee = employee.into_employee(self.table.allocate_id());
        rows.push(employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: u64, changes: EmployeeChanges) -> AppResult<Option<Employee>> {
        let mut rows = self.table.write()?;
        Ok(rows.iter_mut().find(|e| e.id == id).map(|employee| {
            changes.apply_to(employee);
            employee.clone()
        }))
    }

    async fn delete(&self, id: u64) -> AppResult<Option<Employee>> {
        let mut rows = self.table.write()?;
        let position = rows.iter().position(|e| e.id == id);
        Ok(position.map(|i| rows.remove(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_record(employee_id: &str) -> NewAttendance {
        NewAttendance {
            employee_id: employee_id.into(),
            employee_name: "John Doe".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            login_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            logout_time: None,
            total_hours: 0.0,
            is_late: false,
            location: "Office".into(),
            is_actually_present: None,
            remarks: None,
        }
    }

    #[actix_web::test]
    async fn insert_rejects_second_present_record_for_the_day() {
        let store = MemoryAttendanceStore::default();
        let first = store.insert(new_record("EMP001")).await.unwrap();

        let err = store.insert(new_record("EMP001")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        store.insert(new_record("EMP002")).await.unwrap();

        store.set_status(first.id, AttendanceStatus::Absent).await.unwrap();
        store.insert(new_record("EMP001")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 3);
    }
}
