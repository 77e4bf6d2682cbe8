use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use crate::db::entities::{prelude::*, project, project_collaborator, project_skill};
use crate::db::enums::{ProjectStatus, UserRole};
use crate::db::models::{Actor, ProjectDetails};
use crate::db::services::match_service::profile_of;
use crate::db::services::{ServiceError, tag_service};
use crate::web::models::ProjectRequest;

fn validate(request: &ProjectRequest) -> Result<(), ServiceError> {
    if request.description.trim().is_empty() {
        return Err(ServiceError::Validation("Project description is required.".to_string()));
    }
    if request.terms_of_contract.trim().is_empty() {
        return Err(ServiceError::Validation("Terms of contract are required.".to_string()));
    }
    Ok(())
}

/// Maps project id to its required skill names, alphabetically.
pub async fn required_skill_names<C: ConnectionTrait>(
    db: &C,
    project_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr> {
    let rows = ProjectSkill::find()
        .filter(project_skill::Column::ProjectId.is_in(project_ids.iter().copied()))
        .find_also_related(Tag)
        .all(db)
        .await?;

    let mut names: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, tag) in rows {
        if let Some(tag) = tag {
            names.entry(link.project_id).or_default().push(tag.name);
        }
    }
    for skills in names.values_mut() {
        skills.sort();
    }
    Ok(names)
}

async fn with_details<C: ConnectionTrait>(
    db: &C,
    projects: Vec<project::Model>,
) -> Result<Vec<ProjectDetails>, DbErr> {
    let ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let mut skills = required_skill_names(db, &ids).await?;

    let mut collaborators: HashMap<i32, Vec<i32>> = HashMap::new();
    for row in ProjectCollaborator::find()
        .filter(project_collaborator::Column::ProjectId.is_in(ids))
        .order_by_asc(project_collaborator::Column::UserId)
        .all(db)
        .await?
    {
        collaborators.entry(row.project_id).or_default().push(row.user_id);
    }

    Ok(projects
        .into_iter()
        .map(|project| ProjectDetails {
            required_skills: skills.remove(&project.id).unwrap_or_default(),
            collaborator_ids: collaborators.remove(&project.id).unwrap_or_default(),
            project,
        })
        .collect())
}

/// Replaces the required skills of a project.
async fn replace_project_skills<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    names: &[String],
) -> Result<(), DbErr> {
    ProjectSkill::delete_many()
        .filter(project_skill::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;

    let tags = tag_service::get_or_create_tags(db, names).await?;
    if !tags.is_empty() {
        let links = tags.iter().map(|t| project_skill::ActiveModel {
            project_id: Set(project_id),
            tag_id: Set(t.id),
        });
        ProjectSkill::insert_many(links).exec_without_returning(db).await?;
    }
    Ok(())
}

pub async fn create_project(
    db: &DatabaseConnection,
    actor: &Actor,
    request: ProjectRequest,
) -> Result<ProjectDetails, ServiceError> {
    if actor.role != UserRole::Organization {
        return Err(ServiceError::Forbidden(
            "Only organizations can publish projects.".to_string(),
        ));
    }
    validate(&request)?;

    let txn = db.begin().await?;
    let profile = profile_of(&txn, actor.user_id).await?;

    let saved = project::ActiveModel {
        profile_id: Set(profile.id),
        description: Set(request.description.trim().to_string()),
        terms_of_contract: Set(request.terms_of_contract.trim().to_string()),
        status: Set(request.status.unwrap_or(ProjectStatus::Ongoing)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    replace_project_skills(&txn, saved.id, &request.required_skills).await?;

    let details = with_details(&txn, vec![saved]).await?.remove(0);
    txn.commit().await?;

    info!(project_id = details.project.id, owner_id = actor.user_id, "Project created.");
    Ok(details)
}

/// Only the owning profile may edit; other callers get `NotFound`.
pub async fn update_project(
    db: &DatabaseConnection,
    actor: &Actor,
    project_id: i32,
    request: ProjectRequest,
) -> Result<ProjectDetails, ServiceError> {
    validate(&request)?;

    let txn = db.begin().await?;
    let profile = profile_of(&txn, actor.user_id).await?;
    let existing = Project::find_by_id(project_id)
        .filter(project::Column::ProfileId.eq(profile.id))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Project {project_id} not found.")))?;

    let mut active = existing.into_active_model();
    active.description = Set(request.description.trim().to_string());
    active.terms_of_contract = Set(request.terms_of_contract.trim().to_string());
    if let Some(status) = request.status {
        active.status = Set(status);
    }
    let saved = active.update(&txn).await?;
    replace_project_skills(&txn, saved.id, &request.required_skills).await?;

    let details = with_details(&txn, vec![saved]).await?.remove(0);
    txn.commit().await?;

    info!(project_id, "Project updated.");
    Ok(details)
}

pub async fn delete_project(
    db: &DatabaseConnection,
    actor: &Actor,
    project_id: i32,
) -> Result<(), ServiceError> {
    let profile = profile_of(db, actor.user_id).await?;
    let result = Project::delete_many()
        .filter(project::Column::Id.eq(project_id))
        .filter(project::Column::ProfileId.eq(profile.id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("Project {project_id} not found.")));
    }
    info!(project_id, "Project deleted.");
    Ok(())
}

/// Projects owned by the user's profile, oldest first.
pub async fn list_projects_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ProjectDetails>, ServiceError> {
    let profile = profile_of(db, user_id).await?;
    let projects = Project::find()
        .filter(project::Column::ProfileId.eq(profile.id))
        .order_by_asc(project::Column::Id)
        .all(db)
        .await?;
    Ok(with_details(db, projects).await?)
}

pub async fn get_project_details(
    db: &DatabaseConnection,
    project_id: i32,
) -> Result<ProjectDetails, ServiceError> {
    let project = Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Project {project_id} not found.")))?;
    Ok(with_details(db, vec![project]).await?.remove(0))
}
