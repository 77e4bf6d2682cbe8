use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use tracing::info;

use crate::db::entities::{profile, user};
use crate::db::models::NewUser;
use crate::db::services::ServiceError;

// --- User Service Functions ---

/// Creates a user together with its empty profile.
///
/// Both rows are written in one transaction: a user without a profile is
/// never observable.
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model, ServiceError> {
    let now = Utc::now();
    let email = new_user.email.trim().to_lowercase();

    let txn = db.begin().await?;

    let user_model = user::ActiveModel {
        email: Set(email.clone()),
        password_hash: Set(new_user.password_hash),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        role: Set(new_user.role),
        is_admin: Set(new_user.is_admin),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|db_err| match db_err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("Email {email} is already registered."))
        }
        _ => ServiceError::DbErr(db_err),
    })?;

    profile::ActiveModel {
        user_id: Set(user_model.id),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(user_id = user_model.id, role = %user_model.role, "Created user with empty profile.");
    Ok(user_model)
}

/// Retrieves a user by their ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(user_id).one(db).await
}

/// Retrieves a user by their email address (case-insensitive).
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
}

/// Sets the administrator flag on an existing account.
pub async fn grant_admin(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, DbErr> {
    let existing = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound(format!("user {user_id}")))?;
    let mut active = existing.into_active_model();
    active.is_admin = Set(true);
    let updated = active.update(db).await?;
    info!(user_id, "Granted administrator rights.");
    Ok(updated)
}

/// Deletes a user. Profile, posts, projects, requests and connections go with it.
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<u64, DbErr> {
    let result = user::Entity::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected > 0 {
        info!(user_id, "Deleted user account.");
    }
    Ok(result.rows_affected)
}
