use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use std::sync::Arc;

use crate::db::entities::post;
use crate::db::models::PostWithAuthor;
use crate::db::services;
use crate::web::models::{AuthenticatedUser, PostRequest};
use crate::web::{AppError, AppState};

async fn list_posts_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostWithAuthor>>, AppError> {
    let posts = services::list_posts(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(posts))
}

async fn my_posts_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<post::Model>>, AppError> {
    let posts = services::list_posts_by_user(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(posts))
}

async fn create_post_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<PostRequest>,
) -> Result<(StatusCode, Json<post::Model>), AppError> {
    let post =
        services::create_post(&app_state.db_pool, &authenticated_user.actor(), payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
    Json(payload): Json<PostRequest>,
) -> Result<Json<post::Model>, AppError> {
    let post = services::update_post(
        &app_state.db_pool,
        &authenticated_user.actor(),
        post_id,
        payload,
    )
    .await?;
    Ok(Json(post))
}

async fn delete_post_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_post(&app_state.db_pool, &authenticated_user.actor(), post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_posts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_posts_handler).post(create_post_handler))
        .route("/mine", get(my_posts_handler))
        .route("/{id}", put(update_post_handler).delete(delete_post_handler))
}
