//! In-memory SQLite fixtures shared by the service tests.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};

use crate::db::entities::{prelude::*, project, project_skill, user};
use crate::db::enums::{ProjectStatus, UserRole};
use crate::db::models::NewUser;
use crate::db::schema::create_schema;
use crate::db::services::match_service::profile_of;
use crate::db::services::{profile_service, tag_service, user_service};

/// A fresh database with the full schema. A single pooled connection keeps
/// every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    create_schema(&db).await.unwrap();
    db
}

pub fn new_user(email: &str, role: UserRole) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role,
        is_admin: false,
    }
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    user_service::create_user(db, new_user(email, role)).await.unwrap()
}

pub async fn set_skills(db: &DatabaseConnection, user_id: i32, skills: &[&str]) {
    let profile = profile_of(db, user_id).await.unwrap();
    profile_service::replace_profile_skills(db, profile.id, skills)
        .await
        .unwrap();
}

/// Inserts a project for any user, skipping the organization-only check.
pub async fn seed_project(db: &DatabaseConnection, owner_id: i32, skills: &[&str]) -> project::Model {
    let profile = profile_of(db, owner_id).await.unwrap();
    let saved = project::ActiveModel {
        profile_id: Set(profile.id),
        description: Set(format!("Project of user {owner_id}")),
        terms_of_contract: Set("Fixed price".to_string()),
        status: Set(ProjectStatus::Ongoing),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let tags = tag_service::get_or_create_tags(db, skills).await.unwrap();
    if !tags.is_empty() {
        ProjectSkill::insert_many(tags.iter().map(|t| project_skill::ActiveModel {
            project_id: Set(saved.id),
            tag_id: Set(t.id),
        }))
        .exec_without_returning(db)
        .await
        .unwrap();
    }
    saved
}
