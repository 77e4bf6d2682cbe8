use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use tracing::warn;

use crate::db::entities::{connection, post, prelude::*, profile, project, project_collaborator, user};
use crate::db::enums::UserRole;
use crate::db::models::{Actor, ConnectedUser, ConnectionProfile};
use crate::db::services::ServiceError;
use crate::db::services::experience_service::list_experiences_for_profile;
use crate::db::services::match_service::profile_of;
use crate::db::services::profile_service::load_profile_details;

/// Users the caller has an outgoing connection to, most recent first.
pub async fn list_connections(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ConnectedUser>, ServiceError> {
    let edges = Connection::find()
        .filter(connection::Column::UserId.eq(user_id))
        .order_by_desc(connection::Column::CreatedAt)
        .order_by_asc(connection::Column::ConnectedToId)
        .all(db)
        .await?;
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = edges.iter().map(|e| e.connected_to_id).collect();
    let users: HashMap<i32, user::Model> = User::find()
        .filter(user::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let company_names: HashMap<i32, Option<String>> = Profile::find()
        .filter(profile::Column::UserId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p.company_name))
        .collect();

    Ok(edges
        .into_iter()
        .filter_map(|edge| {
            let user = users.get(&edge.connected_to_id)?;
            Some(ConnectedUser {
                user_id: user.id,
                email: user.email.clone(),
                full_name: user.full_name(),
                role: user.role,
                company_name: company_names.get(&user.id).cloned().flatten(),
                connected_at: edge.created_at,
            })
        })
        .collect())
}

/// Profile of a connected user, with the projects that link the two.
///
/// Collaborations are owned by the organization side of the pair and list the
/// freelancer side as collaborator.
pub async fn get_connection_profile(
    db: &DatabaseConnection,
    viewer: &Actor,
    target_id: i32,
) -> Result<ConnectionProfile, ServiceError> {
    let target = User::find_by_id(target_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {target_id} not found.")))?;

    let connected = Connection::find_by_id((viewer.user_id, target_id))
        .one(db)
        .await?
        .is_some();
    if !connected {
        warn!(viewer_id = viewer.user_id, target_id, "Rejected profile view without a connection.");
        return Err(ServiceError::Forbidden(
            "You can only view profiles of your connections.".to_string(),
        ));
    }

    let (owner_id, collaborator_id) = match viewer.role {
        UserRole::Freelancer => (target_id, viewer.user_id),
        UserRole::Organization => (viewer.user_id, target_id),
    };
    let owner_profile = profile_of(db, owner_id).await?;
    let collaborations = Project::find()
        .filter(project::Column::ProfileId.eq(owner_profile.id))
        .inner_join(ProjectCollaborator)
        .filter(project_collaborator::Column::UserId.eq(collaborator_id))
        .order_by_asc(project::Column::Id)
        .all(db)
        .await?;

    let target_role = target.role;
    let details = load_profile_details(db, target).await?;

    let experiences = if target_role == UserRole::Freelancer {
        list_experiences_for_profile(db, details.profile.id).await?
    } else {
        Vec::new()
    };

    let projects = if target_role == UserRole::Organization {
        Project::find()
            .filter(project::Column::ProfileId.eq(details.profile.id))
            .order_by_asc(project::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .filter(|p| !collaborations.iter().any(|c| c.id == p.id))
            .collect()
    } else {
        Vec::new()
    };

    let posts = Post::find()
        .filter(post::Column::UserId.eq(target_id))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await?;

    Ok(ConnectionProfile {
        details,
        posts,
        experiences,
        projects,
        collaborations,
    })
}
