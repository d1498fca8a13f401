use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_EMPLOYEE_STATUS: &str = "active";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "employeeId": "EMP001",
        "name": "John Doe",
        "email": "john.doe@academy.com",
        "username": "john.doe@academy.com",
        "phone": "+1234567890",
        "department": "Science",
        "position": "Senior Faculty",
        "salary": 75000.0,
        "joinDate": "2024-01-15",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@academy.com")]
    pub email: String,

    #[schema(example = "john.doe@academy.com")]
    pub username: String,

    /// Argon2 hash; never sent to clients.
    #[serde(skip_serializing, default)]
    #[schema(write_only)]
    pub password: String,

    #[schema(example = "+1234567890", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Science", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "Senior Faculty", nullable = true)]
    pub position: Option<String>,

    #[schema(example = 75000.0, nullable = true)]
    pub salary: Option<f64>,

    #[schema(value_type = Option<String>, format = "date", example = "2024-01-15")]
    pub join_date: Option<NaiveDate>,

    #[schema(example = "active")]
    pub status: String,
}

/// Employee fields ready for insertion (password already hashed).
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub join_date: Option<NaiveDate>,
    pub status: String,
}

impl NewEmployee {
    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            employee_id: self.employee_id,
            name: self.name,
            email: self.email,
            username: self.username,
            password: self.password,
            phone: self.phone,
            department: self.department,
            position: self.position,
            salary: self.salary,
            join_date: self.join_date,
            status: self.status,
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub join_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(v) = self.name {
            employee.name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.username {
            employee.username = v;
        }
        if let Some(v) = self.password {
            employee.password = v;
        }
        if self.phone.is_some() {
            employee.phone = self.phone;
        }
        if self.department.is_some() {
            employee.department = self.department;
        }
        if self.position.is_some() {
            employee.position = self.position;
        }
        if self.salary.is_some() {
            employee.salary = self.salary;
        }
        if self.join_date.is_some() {
            employee.join_date = self.join_date;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
    }
}
