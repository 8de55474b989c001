use sea_orm::Order;
use serde::Deserialize;

use crate::error::AppError;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Sort direction accepted by the listing endpoints. Defaults to ascending,
/// matching the original directory listings.
#[derive(Clone, Copy, Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Normalize an email for storage and lookup: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 255
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation("Please provide a valid email".into()));
    }
    Ok(())
}

/// Account holder names are 20-60 characters in this system.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let len = name.trim().chars().count();
    if !(20..=60).contains(&len) {
        return Err(AppError::Validation(
            "Name must be between 20 and 60 characters".into(),
        ));
    }
    Ok(())
}

/// 8-16 characters, at least one uppercase letter and one special character.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if !(8..=16).contains(&password.chars().count()) {
        return Err(AppError::Validation(
            "Password must be between 8 and 16 characters".into(),
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password
        .chars()
        .any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c));
    if !has_upper || !has_special {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter and one special character".into(),
        ));
    }
    Ok(())
}

pub fn validate_address(address: Option<&str>) -> Result<(), AppError> {
    if let Some(address) = address
        && address.chars().count() > 400
    {
        return Err(AppError::Validation(
            "Address must not exceed 400 characters".into(),
        ));
    }
    Ok(())
}
