use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::ProjectDetails;
use crate::db::services;
use crate::web::models::{AuthenticatedUser, ProjectRequest};
use crate::web::{AppError, AppState};

async fn list_own_projects_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectDetails>>, AppError> {
    let projects =
        services::list_projects_for_user(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(projects))
}

async fn create_project_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDetails>), AppError> {
    let project =
        services::create_project(&app_state.db_pool, &authenticated_user.actor(), payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<Json<ProjectDetails>, AppError> {
    let project = services::get_project_details(&app_state.db_pool, project_id).await?;
    Ok(Json(project))
}

async fn update_project_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<ProjectDetails>, AppError> {
    let project = services::update_project(
        &app_state.db_pool,
        &authenticated_user.actor(),
        project_id,
        payload,
    )
    .await?;
    Ok(Json(project))
}

async fn delete_project_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_project(&app_state.db_pool, &authenticated_user.actor(), project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_projects_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_own_projects_handler).post(create_project_handler))
        .route(
            "/{id}",
            get(get_project_handler)
                .put(update_project_handler)
                .delete(delete_project_handler),
        )
}
