use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::ApiResponse;
use crate::auth::{auth::AuthUser, password::hash_password};
use crate::error::{AppError, AppResult};
use crate::model::clock::option_lenient_date;
use crate::model::employee::{DEFAULT_EMPLOYEE_STATUS, EmployeeChanges, NewEmployee};
use crate::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    /// Generated as `EMP<millis>` when omitted
    #[schema(example = "EMP001")]
    pub employee_id: Option<String>,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@academy.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "john.doe@academy.com")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "+1234567890")]
    pub phone: Option<String>,
    #[schema(example = "Science")]
    pub department: Option<String>,
    #[schema(example = "Senior Faculty")]
    pub position: Option<String>,
    #[schema(example = 75000.0)]
    pub salary: Option<f64>,
    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[schema(example = "2024-01-15", format = "date", value_type = Option<String>)]
    pub join_date: Option<NaiveDate>,
    #[schema(example = "active")]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    /// Blank keeps the current password
    pub password: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[schema(example = "2024-01-15", format = "date", value_type = Option<String>)]
    pub join_date: Option<NaiveDate>,
    pub status: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound("Employee not found".into())
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing name, username or password"),
        (status = 409, description = "Username or employee id already taken", body = Object, example = json!({
            "success": false,
            "message": "Username already taken"
        }))
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth, state, payload), fields(admin = %auth.username))]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateEmployee>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let name = payload.name.trim();
    let username = payload.username.trim();
    if name.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Name, username and password are required".into()));
    }

    if state.employees.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let employee_id = trimmed(payload.employee_id)
        .unwrap_or_else(|| format!("EMP{}", Utc::now().timestamp_millis()));
    if state.employees.find_by_employee_id(&employee_id).await?.is_some() {
        return Err(AppError::Conflict(format!("Employee id {employee_id} already taken")));
    }

    let employee = state
        .employees
        .insert(NewEmployee {
            employee_id,
            name: name.to_string(),
            email: payload.email.trim().to_string(),
            username: username.to_string(),
            password: hash_password(&payload.password)?,
            phone: trimmed(payload.phone),
            department: trimmed(payload.department),
            position: trimmed(payload.position),
            salary: payload.salary,
            join_date: payload.join_date,
            status: trimmed(payload.status).unwrap_or_else(|| DEFAULT_EMPLOYEE_STATUS.to_string()),
        })
        .await?;

    // a cached miss for this id would hide the new name
    state.directory.invalidate(&employee.employee_id).await;
    info!(id = employee.id, employee_id = %employee.employee_id, "Employee created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(employee, "Employee created successfully")))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [Employee])
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(_auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let employees = state.employees.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(employees)))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Employees may only read their own record"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "success": false,
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let employee = state
        .employees
        .get(path.into_inner())
        .await?
        .ok_or_else(not_found)?;

    if auth.is_employee() && auth.user_id != employee.employee_id {
        return Err(AppError::Forbidden("Employees may only read their own record".into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(employee)))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth, state, payload), fields(admin = %auth.username))]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let id = path.into_inner();
    let payload = payload.into_inner();

    let username = trimmed(payload.username);
    if let Some(username) = &username {
        if let Some(other) = state.employees.find_by_username(username).await? {
            if other.id != id {
                return Err(AppError::Conflict("Username already taken".into()));
            }
        }
    }

    let password = match trimmed(payload.password) {
        Some(plain) => Some(hash_password(&plain)?),
        None => None,
    };

    let changes = EmployeeChanges {
        name: trimmed(payload.name),
        email: trimmed(payload.email),
        username,
        password,
        phone: trimmed(payload.phone),
        department: trimmed(payload.department),
        position: trimmed(payload.position),
        salary: payload.salary,
        join_date: payload.join_date,
        status: trimmed(payload.status),
    };

    let employee = state
        .employees
        .update(id, changes)
        .await?
        .ok_or_else(not_found)?;

    state.directory.invalidate(&employee.employee_id).await;
    info!(id, employee_id = %employee.employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(employee, "Employee updated successfully")))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "success": true,
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth, state), fields(admin = %auth.username))]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let employee = state
        .employees
        .delete(path.into_inner())
        .await?
        .ok_or_else(not_found)?;

    state.directory.invalidate(&employee.employee_id).await;
    info!(employee_id = %employee.employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::message("Successfully deleted")))
}
