use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::model::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::store::{AttendanceStore, EmployeeStore, day_taken};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, employee_name, date, login_time, logout_time,
    total_hours, is_late, location, is_actually_present, remarks, status
"#;

const EMPLOYEE_COLUMNS: &str = r#"
    id, employee_id, name, email, username, password, phone,
    department, position, salary, join_date, status
"#;

/// MySQL reports duplicate keys with SQLSTATE 23000.
fn is_duplicate(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: String,
    employee_name: String,
    date: NaiveDate,
    login_time: NaiveTime,
    logout_time: Option<NaiveTime>,
    total_hours: f64,
    is_late: bool,
    location: String,
    is_actually_present: Option<bool>,
    remarks: Option<String>,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AttendanceStatus>()
            .map_err(|_| AppError::Internal(format!("unknown attendance status `{}` on row {}", row.status, row.id)))?;

        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            date: row.date,
            login_time: row.login_time,
            logout_time: row.logout_time,
            total_hours: row.total_hours,
            is_late: row.is_late,
            location: row.location,
            is_actually_present: row.is_actually_present,
            remarks: row.remarks,
            status,
        })
    }
}

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn list(&self) -> AppResult<Vec<AttendanceRecord>> {
        let sql = format!("SELECT {} FROM attendance ORDER BY id ASC", ATTENDANCE_COLUMNS);
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Fetched attendance rows");
        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn get(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {} FROM attendance WHERE id = ?", ATTENDANCE_COLUMNS);
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn insert(&self, record: NewAttendance) -> AppResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_id, employee_name, date, login_time, logout_time,
                 total_hours, is_late, location, is_actually_present, remarks, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(record.date)
        .bind(record.login_time)
        .bind(record.logout_time)
        .bind(record.total_hours)
        .bind(record.is_late)
        .bind(&record.location)
        .bind(record.is_actually_present)
        .bind(&record.remarks)
        .bind(AttendanceStatus::Present.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate(&e) {
                day_taken(&record.employee_id, record.date)
            } else {
                AppError::Store(e)
            }
        })?;

        Ok(record.into_record(result.last_insert_id()))
    }

    async fn update_times(
        &self,
        id: u64,
        login_time: NaiveTime,
        logout_time: Option<NaiveTime>,
        total_hours: f64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET login_time = ?, logout_time = ?, total_hours = ?
            WHERE id = ?
            "#,
        )
        .bind(login_time)
        .bind(logout_time)
        .bind(total_hours)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_presence(&self, id: u64, is_actually_present: bool, remarks: Option<String>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET is_actually_present = ?, remarks = COALESCE(?, remarks)
            WHERE id = ?
            "#,
        )
        .bind(is_actually_present)
        .bind(remarks)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, id: u64, status: AttendanceStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE attendance SET status = ? WHERE id = ?")
            .bind(status.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &'static str, value: SqlValue) -> AppResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE {} = ?", EMPLOYEE_COLUMNS, column);
        let query = sqlx::query_as::<_, Employee>(&sql);
        let query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

fn assignments(changes: EmployeeChanges) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    let strings = [
        ("name", changes.name),
        ("email", changes.email),
        ("username", changes.username),
        ("password", changes.password),
        ("phone", changes.phone),
        ("department", changes.department),
        ("position", changes.position),
        ("status", changes.status),
    ];
    for (column, value) in strings {
        if let Some(v) = value {
            out.push((column, SqlValue::String(v)));
        }
    }
    if let Some(salary) = changes.salary {
        out.push(("salary", SqlValue::F64(salary)));
    }
    if let Some(join_date) = changes.join_date {
        out.push(("join_date", SqlValue::Date(join_date)));
    }
    out
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn list(&self) -> AppResult<Vec<Employee>> {
        let sql = format!("SELECT {} FROM employees ORDER BY id ASC", EMPLOYEE_COLUMNS);
        Ok(sqlx::query_as::<_, Employee>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: u64) -> AppResult<Option<Employee>> {
        self.fetch_one_by("id", SqlValue::U64(id)).await
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<Employee>> {
        self.fetch_one_by("employee_id", SqlValue::String(employee_id.to_string()))
            .await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Employee>> {
        self.fetch_one_by("username", SqlValue::String(username.to_string()))
            .await
    }

    async fn insert(&self, employee: NewEmployee) -> AppResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (employee_id, name, email, username, password, phone,
                 department, position, salary, join_date, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.employee_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.username)
        .bind(&employee.password)
        .bind(&employee.phone)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(employee.salary)
        .bind(employee.join_date)
        .bind(&employee.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate(&e) {
                AppError::Conflict("Employee already exists".into())
            } else {
                AppError::Store(e)
            }
        })?;

        Ok(employee.into_employee(result.last_insert_id()))
    }

    async fn update(&self, id: u64, changes: EmployeeChanges) -> AppResult<Option<Employee>> {
        if !changes.is_empty() {
            let update = build_update_sql("employees", assignments(changes), "id", id)?;
            execute_update(&self.pool, update).await.map_err(|e| {
                if is_duplicate(&e) {
                    AppError::Conflict("Username or employee id already taken".into())
                } else {
                    AppError::Store(e)
                }
            })?;
        }

        self.get(id).await
    }

    async fn delete(&self, id: u64) -> AppResult<Option<Employee>> {
        let Some(employee) = self.get(id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(employee))
    }
}
