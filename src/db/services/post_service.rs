use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::db::entities::{post, prelude::*};
use crate::db::models::{Actor, PostWithAuthor};
use crate::db::services::ServiceError;
use crate::web::models::PostRequest;

const DEFAULT_POST_TITLE: &str = "Untitled Post";

/// Trimmed title and content; an empty title falls back to the default.
fn normalize(request: PostRequest) -> Result<(String, String), ServiceError> {
    let content = request.content.trim().to_string();
    if content.is_empty() {
        return Err(ServiceError::Validation("Post content is required.".to_string()));
    }
    let title = request
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_POST_TITLE.to_string());
    Ok((title, content))
}

/// The feed: every post, newest first, with its author's name.
pub async fn list_posts(
    db: &DatabaseConnection,
    viewer_id: i32,
) -> Result<Vec<PostWithAuthor>, ServiceError> {
    let rows = Post::find()
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .find_also_related(User)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(post, author)| PostWithAuthor {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            user_full_name: author.map(|a| a.full_name()).unwrap_or_default(),
            is_owner: post.user_id == viewer_id,
        })
        .collect())
}

pub async fn list_posts_by_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<post::Model>, ServiceError> {
    Ok(Post::find()
        .filter(post::Column::UserId.eq(user_id))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await?)
}

pub async fn create_post(
    db: &DatabaseConnection,
    actor: &Actor,
    request: PostRequest,
) -> Result<post::Model, ServiceError> {
    let (title, content) = normalize(request)?;
    let saved = post::ActiveModel {
        user_id: Set(actor.user_id),
        title: Set(title),
        content: Set(content),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(post_id = saved.id, user_id = actor.user_id, "Post created.");
    Ok(saved)
}

async fn find_own_post(
    db: &DatabaseConnection,
    actor: &Actor,
    post_id: i32,
) -> Result<post::Model, ServiceError> {
    Post::find_by_id(post_id)
        .filter(post::Column::UserId.eq(actor.user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Post {post_id} not found.")))
}

pub async fn update_post(
    db: &DatabaseConnection,
    actor: &Actor,
    post_id: i32,
    request: PostRequest,
) -> Result<post::Model, ServiceError> {
    let (title, content) = normalize(request)?;
    let mut active = find_own_post(db, actor, post_id).await?.into_active_model();
    active.title = Set(title);
    active.content = Set(content);
    Ok(active.update(db).await?)
}

pub async fn delete_post(db: &DatabaseConnection, actor: &Actor, post_id: i32) -> Result<(), ServiceError> {
    let existing = find_own_post(db, actor, post_id).await?;
    Post::delete_by_id(existing.id).exec(db).await?;
    info!(post_id, user_id = actor.user_id, "Post deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::UserRole;
    use crate::db::test_support::{seed_user, setup_db};

    fn request(title: Option<&str>, content: &str) -> PostRequest {
        PostRequest {
            title: title.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_feed_is_newest_first_and_marks_ownership() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice@example.com", UserRole::Freelancer).await;
        let bob = seed_user(&db, "bob@example.com", UserRole::Organization).await;
        let alice_actor = Actor::new(alice.id, UserRole::Freelancer);

        let first = create_post(&db, &alice_actor, request(None, "Hello")).await.unwrap();
        let second = create_post(&db, &Actor::new(bob.id, UserRole::Organization), request(Some("Hiring"), "We are hiring"))
            .await
            .unwrap();
        assert_eq!(first.title, DEFAULT_POST_TITLE);

        let feed = list_posts(&db, alice.id).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, second.id);
        assert!(!feed[0].is_owner);
        assert_eq!(feed[1].id, first.id);
        assert!(feed[1].is_owner);
        assert_eq!(feed[1].user_full_name, "Test User");
    }

    #[tokio::test]
    async fn test_only_author_can_edit_or_delete() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice@example.com", UserRole::Freelancer).await;
        let bob = seed_user(&db, "bob@example.com", UserRole::Freelancer).await;
        let alice_actor = Actor::new(alice.id, UserRole::Freelancer);
        let bob_actor = Actor::new(bob.id, UserRole::Freelancer);

        let post = create_post(&db, &alice_actor, request(Some("Draft"), "Body")).await.unwrap();

        let hijack = update_post(&db, &bob_actor, post.id, request(Some("Mine"), "Body")).await;
        assert!(matches!(hijack, Err(ServiceError::NotFound(_))));
        let removal = delete_post(&db, &bob_actor, post.id).await;
        assert!(matches!(removal, Err(ServiceError::NotFound(_))));

        let edited = update_post(&db, &alice_actor, post.id, request(Some(" Final "), "New body"))
            .await
            .unwrap();
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.content, "New body");

        delete_post(&db, &alice_actor, post.id).await.unwrap();
        assert!(list_posts_by_user(&db, alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice@example.com", UserRole::Freelancer).await;
        let result = create_post(&db, &Actor::new(alice.id, UserRole::Freelancer), request(None, "  ")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
