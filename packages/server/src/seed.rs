use sea_orm::*;
use tracing::info;

use crate::authz::Role;
use crate::config::AuthConfig;
use crate::entity::user;
use crate::utils::hash;

/// Seed the bootstrap admin account.
///
/// Idempotent: an existing row with the same email is left untouched, so
/// restarting the server never resets a changed admin password.
pub async fn seed_admin(db: &DatabaseConnection, auth: &AuthConfig) -> anyhow::Result<()> {
    let email = auth.admin_email.trim().to_lowercase();

    let password = hash::hash_password(&auth.admin_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash bootstrap admin password: {e}"))?;

    let model = user::ActiveModel {
        name: Set("System Administrator".to_string()),
        email: Set(email.clone()),
        password: Set(password),
        address: Set(None),
        role: Set(Role::Admin.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => {
            info!("Seeded bootstrap admin account {}", email);
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
