//! Role-based authorization gate.
//!
//! A pure decision table over (caller role, action): no I/O, no entity state.
//! Handlers call [`check`] before touching the database, so a denied caller
//! never reaches the entity store. Denials surface as `PERMISSION_DENIED`,
//! which is never downgraded to `NOT_FOUND`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Caller role, carried in the JWT role claim and on the user row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
    StoreOwner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::StoreOwner => "store_owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            "store_owner" => Some(Role::StoreOwner),
            _ => None,
        }
    }
}

/// An operation a caller may attempt. The decision depends on the caller's
/// role alone; nothing here reads the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    CreateUser,
    DeleteUser,
    CreateStore,
    DeleteStore,
    ListUsers,
    ListAllStores,
    ViewDashboard,
    SubmitRating,
    DeleteOwnRating,
    /// The user-facing store listing annotated with the caller's own rating.
    BrowseStores,
    ViewOwnStore,
    ViewStoreDetails,
}

/// The decision table from the design: returns `Ok(())` on allow and
/// `AppError::PermissionDenied` on deny.
pub fn check(role: Role, _caller_id: i32, action: Action) -> Result<(), AppError> {
    let allowed = match action {
        // Account and listing administration is admin-only.
        Action::CreateUser
        | Action::DeleteUser
        | Action::CreateStore
        | Action::DeleteStore
        | Action::ListUsers
        | Action::ListAllStores
        | Action::ViewDashboard => role == Role::Admin,

        // Rating mutations and the annotated listing belong to plain users.
        Action::SubmitRating | Action::DeleteOwnRating | Action::BrowseStores => {
            role == Role::User
        }

        Action::ViewOwnStore => role == Role::StoreOwner,

        Action::ViewStoreDetails => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Second stage of the user-deletion decision, applied once the target row
/// has been loaded: admins may not delete *other* admin accounts, while
/// self-deletion is allowed. The caller must already have passed
/// [`check`] for [`Action::DeleteUser`], so a denied role is turned away
/// before any lookup happens.
pub fn check_delete_user_target(
    caller_id: i32,
    target_role: Role,
    target_id: i32,
) -> Result<(), AppError> {
    if target_role == Role::Admin && target_id != caller_id {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}
