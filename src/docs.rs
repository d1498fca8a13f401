use crate::api::attendance::{PresenceUpdate, TimeCorrection};
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::attendance::{DashboardSummary, ManualEntry};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::models::{LoginReqDto, LoginResponse, SessionUser};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance administration

Admins review and correct daily attendance:

- **Records**: list with employee and date-range filters, add manual entries,
  correct login/logout times, override presence, mark absent
- **Dashboard**: daily login count, distinct locations and late arrivals
- **Reports**: full and late-login CSV exports
- **Employees**: the directory that attendance names are resolved against

### Security
Everything under `/api` needs a **JWT Bearer** token from `POST /auth/login`.
Attendance and employee writes are admin-only.

### Response format
JSON envelope `{ "success": bool, "data"?: ..., "message"?: string }`;
CSV exports are returned as file attachments.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::me,

        crate::api::attendance::list_attendance,
        crate::api::attendance::create_manual,
        crate::api::attendance::update_times,
        crate::api::attendance::update_presence,
        crate::api::attendance::mark_absent,
        crate::api::attendance::dashboard_summary,
        crate::api::attendance::export_report,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            SessionUser,
            AttendanceRecord,
            AttendanceStatus,
            ManualEntry,
            TimeCorrection,
            PresenceUpdate,
            DashboardSummary,
            CreateEmployee,
            UpdateEmployee,
            Employee
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and session APIs"),
        (name = "Attendance", description = "Attendance administration APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
