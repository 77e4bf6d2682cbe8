use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use tracing::info;

use crate::db::entities::{prelude::*, profile_skill, tag, user};
use crate::db::enums::UserRole;
use crate::db::models::{Actor, ProfileDetails};
use crate::db::services::match_service::profile_of;
use crate::db::services::{ServiceError, tag_service};
use crate::web::models::UpdateProfileRequest;

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Skill names attached to a profile, alphabetically.
pub async fn skill_names<C: ConnectionTrait>(db: &C, profile_id: i32) -> Result<Vec<String>, DbErr> {
    let mut names: Vec<String> = ProfileSkill::find()
        .filter(profile_skill::Column::ProfileId.eq(profile_id))
        .find_also_related(Tag)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, tag)| tag.map(|t| t.name))
        .collect();
    names.sort();
    Ok(names)
}

pub(crate) async fn load_profile_details<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
) -> Result<ProfileDetails, ServiceError> {
    let profile = profile_of(db, user.id).await?;
    let skills = skill_names(db, profile.id).await?;
    Ok(ProfileDetails {
        user_id: user.id,
        full_name: user.full_name(),
        email: user.email,
        role: user.role,
        profile,
        skills,
    })
}

pub async fn get_profile_details(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<ProfileDetails, ServiceError> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {user_id} not found.")))?;
    load_profile_details(db, user).await
}

/// Replaces the profile's skill set, creating unknown tags on the way.
pub async fn replace_profile_skills<C, S>(
    db: &C,
    profile_id: i32,
    names: &[S],
) -> Result<Vec<tag::Model>, DbErr>
where
    C: ConnectionTrait,
    S: AsRef<str>,
{
    ProfileSkill::delete_many()
        .filter(profile_skill::Column::ProfileId.eq(profile_id))
        .exec(db)
        .await?;

    let tags = tag_service::get_or_create_tags(db, names).await?;
    if !tags.is_empty() {
        let links = tags.iter().map(|t| profile_skill::ActiveModel {
            profile_id: Set(profile_id),
            tag_id: Set(t.id),
        });
        ProfileSkill::insert_many(links).exec_without_returning(db).await?;
    }
    Ok(tags)
}

/// Updates the caller's own profile.
///
/// Company name only applies to organizations and social links only to
/// freelancers; the other kind's fields are ignored.
pub async fn update_profile(
    db: &DatabaseConnection,
    actor: &Actor,
    request: UpdateProfileRequest,
) -> Result<ProfileDetails, ServiceError> {
    let txn = db.begin().await?;

    let user = User::find_by_id(actor.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found.", actor.user_id)))?;
    let profile = profile_of(&txn, actor.user_id).await?;
    let profile_id = profile.id;

    let mut active = profile.into_active_model();
    if let Some(bio) = request.bio {
        active.bio = Set(blank_to_none(bio));
    }
    if let Some(website) = request.website {
        active.website = Set(blank_to_none(website));
    }
    if let Some(industry) = request.industry {
        active.industry = Set(blank_to_none(industry));
    }
    match user.role {
        UserRole::Organization => {
            if let Some(company_name) = request.company_name {
                active.company_name = Set(blank_to_none(company_name));
            }
        }
        UserRole::Freelancer => {
            if let Some(linkedin) = request.linkedin_url {
                active.linkedin_url = Set(blank_to_none(linkedin));
            }
            if let Some(github) = request.github_url {
                active.github_url = Set(blank_to_none(github));
            }
        }
    }
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    if let Some(skills) = request.skills {
        replace_profile_skills(&txn, profile_id, skills.as_slice()).await?;
    }

    let details = load_profile_details(&txn, user).await?;
    txn.commit().await?;

    info!(user_id = actor.user_id, "Profile updated.");
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, setup_db};

    #[tokio::test]
    async fn test_update_profile_replaces_skills_and_ignores_other_role_fields() {
        let db = setup_db().await;
        let freelancer = seed_user(&db, "f@example.com", UserRole::Freelancer).await;
        let actor = Actor::new(freelancer.id, UserRole::Freelancer);

        let first = update_profile(
            &db,
            &actor,
            UpdateProfileRequest {
                bio: Some("Backend developer".to_string()),
                company_name: Some("Should be ignored".to_string()),
                github_url: Some("https://github.com/f".to_string()),
                skills: Some(vec!["Python".to_string(), "Django".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(first.skills, vec!["Django".to_string(), "Python".to_string()]);
        assert_eq!(first.profile.bio.as_deref(), Some("Backend developer"));
        assert!(first.profile.company_name.is_none());
        assert_eq!(first.profile.github_url.as_deref(), Some("https://github.com/f"));

        let second = update_profile(
            &db,
            &actor,
            UpdateProfileRequest {
                bio: Some("   ".to_string()),
                skills: Some(vec!["React".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(second.skills, vec!["React".to_string()]);
        assert!(second.profile.bio.is_none());
        // Untouched fields survive.
        assert_eq!(second.profile.github_url.as_deref(), Some("https://github.com/f"));
    }

    #[tokio::test]
    async fn test_organization_can_set_company_name() {
        let db = setup_db().await;
        let org = seed_user(&db, "o@example.com", UserRole::Organization).await;

        let details = update_profile(
            &db,
            &Actor::new(org.id, UserRole::Organization),
            UpdateProfileRequest {
                company_name: Some("Acme".to_string()),
                linkedin_url: Some("https://linkedin.com/acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(details.profile.company_name.as_deref(), Some("Acme"));
        assert!(details.profile.linkedin_url.is_none());

        let fetched = get_profile_details(&db, org.id).await.unwrap();
        assert_eq!(fetched.profile.company_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_get_profile_details_for_unknown_user() {
        let db = setup_db().await;
        let result = get_profile_details(&db, 42).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
