use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@academy.com")]
    pub username: String,
    #[schema(example = "secret")]
    pub password: String,
}

/// Who a token was issued to, as returned to clients on login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    #[schema(example = "EMP001")]
    pub id: String,
    #[schema(value_type = String, example = "employee")]
    pub role: Role,
    #[schema(example = "john.doe@academy.com")]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "john.doe@academy.com")]
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// username
    pub sub: String,
    /// `admin`, or the employee id
    pub user_id: String,
    pub role: Role,
    pub name: Option<String>,
    pub exp: usize,
    pub jti: String,
}
