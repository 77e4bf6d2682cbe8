use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::db::entities::{experience, prelude::*};
use crate::db::models::Actor;
use crate::db::services::ServiceError;
use crate::db::services::match_service::profile_of;
use crate::web::models::ExperienceRequest;

const MAX_YEARS: f64 = 999.9;

struct ValidExperience {
    organization: String,
    role: String,
    years: f64,
    details: Option<String>,
}

fn validate(request: ExperienceRequest) -> Result<ValidExperience, ServiceError> {
    let organization = request.organization.trim().to_string();
    let role = request.role.trim().to_string();
    if organization.is_empty() || role.is_empty() {
        return Err(ServiceError::Validation(
            "Organization and role are required.".to_string(),
        ));
    }
    if !request.years.is_finite() || request.years < 0.0 || request.years > MAX_YEARS {
        return Err(ServiceError::Validation(format!(
            "Years must be between 0 and {MAX_YEARS}."
        )));
    }
    Ok(ValidExperience {
        organization,
        role,
        years: (request.years * 10.0).round() / 10.0,
        details: request
            .details
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}

/// Experiences of a profile, in the order they were added.
pub async fn list_experiences_for_profile<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
) -> Result<Vec<experience::Model>, ServiceError> {
    Ok(Experience::find()
        .filter(experience::Column::ProfileId.eq(profile_id))
        .order_by_asc(experience::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_experiences(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<experience::Model>, ServiceError> {
    let profile = profile_of(db, user_id).await?;
    list_experiences_for_profile(db, profile.id).await
}

pub async fn add_experience(
    db: &DatabaseConnection,
    actor: &Actor,
    request: ExperienceRequest,
) -> Result<experience::Model, ServiceError> {
    let valid = validate(request)?;
    let profile = profile_of(db, actor.user_id).await?;

    let saved = experience::ActiveModel {
        profile_id: Set(profile.id),
        organization: Set(valid.organization),
        role: Set(valid.role),
        years: Set(valid.years),
        details: Set(valid.details),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(experience_id = saved.id, user_id = actor.user_id, "Experience added.");
    Ok(saved)
}

/// Looks up an experience on the caller's own profile; anything else is `NotFound`.
async fn find_own_experience(
    db: &DatabaseConnection,
    actor: &Actor,
    experience_id: i32,
) -> Result<experience::Model, ServiceError> {
    let profile = profile_of(db, actor.user_id).await?;
    Experience::find_by_id(experience_id)
        .filter(experience::Column::ProfileId.eq(profile.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Experience {experience_id} not found.")))
}

pub async fn update_experience(
    db: &DatabaseConnection,
    actor: &Actor,
    experience_id: i32,
    request: ExperienceRequest,
) -> Result<experience::Model, ServiceError> {
    let valid = validate(request)?;
    let mut active = find_own_experience(db, actor, experience_id)
        .await?
        .into_active_model();
    active.organization = Set(valid.organization);
    active.role = Set(valid.role);
    active.years = Set(valid.years);
    active.details = Set(valid.details);
    Ok(active.update(db).await?)
}

pub async fn delete_experience(
    db: &DatabaseConnection,
    actor: &Actor,
    experience_id: i32,
) -> Result<(), ServiceError> {
    let existing = find_own_experience(db, actor, experience_id).await?;
    Experience::delete_by_id(existing.id).exec(db).await?;
    info!(experience_id, user_id = actor.user_id, "Experience deleted.");
    Ok(())
}
