use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use tracing::{info, warn};

use crate::db::entities::{prelude::*, user};
use crate::db::enums::UserRole;
use crate::db::models::{Actor, AdminStats};
use crate::db::services::ServiceError;

pub fn require_admin(actor: &Actor) -> Result<(), ServiceError> {
    if !actor.is_admin {
        warn!(user_id = actor.user_id, "Rejected non-admin access to admin operation.");
        return Err(ServiceError::Forbidden("Administrator access required.".to_string()));
    }
    Ok(())
}

pub async fn get_admin_stats(db: &DatabaseConnection, actor: &Actor) -> Result<AdminStats, ServiceError> {
    require_admin(actor)?;

    let (total_users, freelancers, organizations, projects, posts, matches) = futures::try_join!(
        User::find().count(db),
        User::find()
            .filter(user::Column::Role.eq(UserRole::Freelancer))
            .count(db),
        User::find()
            .filter(user::Column::Role.eq(UserRole::Organization))
            .count(db),
        Project::find().count(db),
        Post::find().count(db),
        MatchRequest::find().count(db),
    )?;

    Ok(AdminStats {
        total_users,
        freelancers,
        organizations,
        projects,
        posts,
        matches,
    })
}

pub async fn admin_delete_user(db: &DatabaseConnection, actor: &Actor, user_id: i32) -> Result<(), ServiceError> {
    require_admin(actor)?;
    if actor.user_id == user_id {
        return Err(ServiceError::Validation(
            "Administrators cannot delete their own account here.".to_string(),
        ));
    }
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("User {user_id} not found.")));
    }
    info!(admin_id = actor.user_id, user_id, "Admin deleted user.");
    Ok(())
}

pub async fn admin_delete_post(db: &DatabaseConnection, actor: &Actor, post_id: i32) -> Result<(), ServiceError> {
    require_admin(actor)?;
    let result = Post::delete_by_id(post_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("Post {post_id} not found.")));
    }
    info!(admin_id = actor.user_id, post_id, "Admin deleted post.");
    Ok(())
}

pub async fn admin_delete_project(
    db: &DatabaseConnection,
    actor: &Actor,
    project_id: i32,
) -> Result<(), ServiceError> {
    require_admin(actor)?;
    let result = Project::delete_by_id(project_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("Project {project_id} not found.")));
    }
    info!(admin_id = actor.user_id, project_id, "Admin deleted project.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::services::MatchService;
    use crate::db::test_support::{seed_project, seed_user, set_skills, setup_db};
    use std::sync::Arc;

    fn admin(user_id: i32) -> Actor {
        Actor {
            user_id,
            role: UserRole::Organization,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_stats_count_each_kind() {
        let db = Arc::new(setup_db().await);
        let f1 = seed_user(&db, "f1@example.com", UserRole::Freelancer).await;
        seed_user(&db, "f2@example.com", UserRole::Freelancer).await;
        let o1 = seed_user(&db, "o1@example.com", UserRole::Organization).await;
        set_skills(&db, f1.id, &["Go"]).await;
        let project = seed_project(&db, o1.id, &["Go"]).await;
        MatchService::new(db.clone())
            .request_match(&Actor::new(f1.id, UserRole::Freelancer), project.id)
            .await
            .unwrap();

        let stats = get_admin_stats(&db, &admin(o1.id)).await.unwrap();
        assert_eq!(
            stats,
            AdminStats {
                total_users: 3,
                freelancers: 2,
                organizations: 1,
                projects: 1,
                posts: 0,
                matches: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let db = setup_db().await;
        let user = seed_user(&db, "plain@example.com", UserRole::Organization).await;
        let actor = Actor::new(user.id, UserRole::Organization);

        assert!(matches!(get_admin_stats(&db, &actor).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            admin_delete_post(&db, &actor, 1).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self_but_can_delete_others() {
        let db = setup_db().await;
        let root = seed_user(&db, "root@example.com", UserRole::Organization).await;
        let victim = seed_user(&db, "victim@example.com", UserRole::Freelancer).await;

        let own = admin_delete_user(&db, &admin(root.id), root.id).await;
        assert!(matches!(own, Err(ServiceError::Validation(_))));

        admin_delete_user(&db, &admin(root.id), victim.id).await.unwrap();
        let again = admin_delete_user(&db, &admin(root.id), victim.id).await;
        assert!(matches!(again, Err(ServiceError::NotFound(_))));
    }
}
