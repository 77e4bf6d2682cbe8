use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::db::models::AdminStats;
use crate::db::services;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

async fn stats_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<AdminStats>, AppError> {
    let stats = services::get_admin_stats(&app_state.db_pool, &authenticated_user.actor()).await?;
    Ok(Json(stats))
}

async fn delete_user_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::admin_delete_user(&app_state.db_pool, &authenticated_user.actor(), user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_post_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(post_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::admin_delete_post(&app_state.db_pool, &authenticated_user.actor(), post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_project_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::admin_delete_project(&app_state.db_pool, &authenticated_user.actor(), project_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/users/{id}", delete(delete_user_handler))
        .route("/posts/{id}", delete(delete_post_handler))
        .route("/projects/{id}", delete(delete_project_handler))
}
