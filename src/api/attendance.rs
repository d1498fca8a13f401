use actix_web::http::header::ContentDisposition;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::ApiResponse;
use crate::attendance::export::ReportKind;
use crate::attendance::{AttendanceFilter, ManualEntry};
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::clock::{option_hhmm, option_lenient_date};
use crate::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeCorrection {
    #[serde(default, deserialize_with = "option_hhmm::deserialize")]
    #[schema(value_type = String, example = "09:00")]
    pub login_time: Option<NaiveTime>,

    #[serde(default, deserialize_with = "option_hhmm::deserialize")]
    #[schema(value_type = Option<String>, example = "17:30")]
    pub logout_time: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    #[schema(example = false)]
    pub is_actually_present: bool,

    #[schema(example = "Logged in from home")]
    pub remarks: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Day to summarize (YYYY-MM-DD); today (UTC) when omitted
    #[serde(default, deserialize_with = "option_lenient_date::deserialize")]
    #[param(value_type = Option<String>, example = "2024-01-15")]
    pub date: Option<NaiveDate>,
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Matching records in storage order", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AttendanceFilter>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let records = state.attendance.list_records(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(records)))
}

/// Create a manual attendance entry
#[utoipa::path(
    post,
    path = "/api/attendance/manual",
    request_body = ManualEntry,
    responses(
        (status = 201, description = "Record created", body = AttendanceRecord),
        (status = 400, description = "Missing required fields", body = Object, example = json!({
            "success": false,
            "message": "employeeName, date and loginTime are required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Employee already has a record for that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(auth, state, payload), fields(admin = %auth.username))]
pub async fn create_manual(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ManualEntry>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let record = state
        .attendance
        .create_manual_record(payload.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(record, "Attendance record added")))
}

/// Correct login/logout times
#[utoipa::path(
    patch,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance record id")),
    request_body = TimeCorrection,
    responses(
        (status = 200, description = "Record updated; totalHours recomputed", body = AttendanceRecord),
        (status = 400, description = "loginTime missing"),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "success": false,
            "message": "Attendance record 42 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(auth, state, payload), fields(admin = %auth.username))]
pub async fn update_times(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<TimeCorrection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let id = path.into_inner();
    let TimeCorrection {
        login_time,
        logout_time,
    } = payload.into_inner();

    let record = state
        .attendance
        .update_times(id, login_time, logout_time)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(record, "Attendance record updated")))
}

/// Set the presence override
#[utoipa::path(
    patch,
    path = "/api/attendance/{id}/presence",
    params(("id" = u64, Path, description = "Attendance record id")),
    request_body = PresenceUpdate,
    responses(
        (status = 200, description = "Presence updated", body = AttendanceRecord),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_presence(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<PresenceUpdate>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let PresenceUpdate {
        is_actually_present,
        remarks,
    } = payload.into_inner();

    let record = state
        .attendance
        .set_presence(path.into_inner(), is_actually_present, remarks)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(record)))
}

/// Mark an attendance record absent
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance record id")),
    responses(
        (status = 200, description = "Record marked absent", body = Object, example = json!({
            "success": true,
            "message": "Attendance record marked absent"
        })),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(auth, state), fields(admin = %auth.username))]
pub async fn mark_absent(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    state.attendance.mark_absent(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Attendance record marked absent")))
}

/// Dashboard figures for one day
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Login count, locations and late arrivals", body = DashboardSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn dashboard_summary(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SummaryQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.attendance.dashboard_summary(date).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary)))
}

/// Download a CSV report of the filtered records
#[utoipa::path(
    get,
    path = "/api/attendance/export/{kind}",
    params(
        ("kind" = String, Path, description = "`full` or `late`"),
        AttendanceFilter
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 400, description = "Unknown report kind")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(auth, state, query), fields(admin = %auth.username))]
pub async fn export_report(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<AttendanceFilter>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let kind: ReportKind = path.parse().map_err(|_| {
        AppError::Validation(format!("Unknown report kind `{}`; expected full or late", path.as_str()))
    })?;

    let records = state.attendance.list_records(&query).await?;
    let body = kind.render(&records)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition::attachment(kind.file_name(Utc::now().date_naive())))
        .body(body))
}
