use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;

#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `admin`, or the employee id
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub name: Option<String>,
}

impl AuthUser {
    fn from_header(req: &HttpRequest) -> Result<Self, AppError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Auth("Missing token".into()))?;

        let config = req
            .app_data::<Data<Config>>()
            .ok_or_else(|| AppError::Internal("Config missing".into()))?;

        let claims = verify_token(token, &config.jwt_secret)
            .map_err(|_| AppError::Auth("Invalid or expired token".into()))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role: claims.role,
            name: claims.name,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // The auth middleware has usually decoded the token already.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        ready(Self::from_header(req))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin only".into()))
        }
    }

    /// Returns true if the user is an employee
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}
