use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::error::AppError;
use crate::models::shared::{validate_address, validate_email, validate_name, validate_password};

/// Request body for account registration. Self-registered accounts always
/// get the `user` role; only admins can create other roles.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Full name (20-60 characters).
    #[schema(example = "Alice Wonderland Cartwright")]
    pub name: String,
    /// Unique email, stored lowercased.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-16 chars, at least one uppercase and one special character).
    #[schema(example = "s3cure_Pass!")]
    pub password: String,
    /// Optional address (max 400 characters).
    pub address: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_address(payload.address.as_deref())?;
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "s3cure_Pass!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Request body for changing the caller's own password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdatePasswordRequest {
    /// Current password, verified before the change is applied.
    pub current_password: String,
    /// New password (same policy as registration).
    pub new_password: String,
}

pub fn validate_update_password_request(payload: &UpdatePasswordRequest) -> Result<(), AppError> {
    if payload.current_password.is_empty() {
        return Err(AppError::Validation(
            "Current password must not be empty".into(),
        ));
    }
    validate_password(&payload.new_password)
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    /// ID of the newly created account.
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice@example.com")]
    pub email: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub role: Role,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Alice Wonderland Cartwright")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
}
