use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::api::ApiResponse;
use crate::auth::{auth::AuthUser, jwt::generate_access_token, password::verify_password};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse, SessionUser};
use crate::state::AppState;

const ADMIN_ID: &str = "admin";

fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid credentials".into())
}

/// Exchange credentials for a signed session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Username or password missing", body = Object, example = json!({
            "success": false,
            "message": "Username or password required"
        })),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "success": false,
            "message": "Invalid credentials"
        })),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    let username = user.username.trim();
    if username.is_empty() || user.password.is_empty() {
        return Err(AppError::Validation("Username or password required".into()));
    }

    let session = if username == config.admin_username && user.password == config.admin_password {
        SessionUser {
            id: ADMIN_ID.to_string(),
            role: Role::Admin,
            username: username.to_string(),
            name: None,
            email: None,
        }
    } else {
        debug!("Fetching employee by username");
        let employee = state
            .employees
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                info!("Invalid credentials: user not found");
                invalid_credentials()
            })?;

        if !verify_password(&user.password, &employee.password) {
            info!("Invalid credentials: password mismatch");
            return Err(invalid_credentials());
        }

        SessionUser {
            id: employee.employee_id,
            role: Role::Employee,
            username: employee.username,
            name: Some(employee.name),
            email: Some(employee.email),
        }
    };

    let token = generate_access_token(&session, &config.jwt_secret, config.access_token_ttl)?;

    info!(role = %session.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        user: session,
    }))
}

/// The caller's identity, as carried by the bearer token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = Object, example = json!({
            "success": true,
            "data": { "id": "EMP001", "role": "employee", "username": "john.doe@academy.com", "name": "John Doe" }
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(SessionUser {
        id: auth.user_id,
        role: auth.role,
        username: auth.username,
        name: auth.name,
        email: None,
    }))
}
