use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use std::sync::Arc;

use crate::db::entities::experience;
use crate::db::models::ProfileDetails;
use crate::db::services;
use crate::web::models::{AuthenticatedUser, ExperienceRequest, UpdateProfileRequest};
use crate::web::{AppError, AppState};

async fn get_profile_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ProfileDetails>, AppError> {
    let details = services::get_profile_details(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(details))
}

async fn update_profile_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileDetails>, AppError> {
    let details =
        services::update_profile(&app_state.db_pool, &authenticated_user.actor(), payload).await?;
    Ok(Json(details))
}

async fn list_experiences_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<experience::Model>>, AppError> {
    let experiences = services::list_experiences(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(experiences))
}

async fn add_experience_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ExperienceRequest>,
) -> Result<(StatusCode, Json<experience::Model>), AppError> {
    let experience =
        services::add_experience(&app_state.db_pool, &authenticated_user.actor(), payload).await?;
    Ok((StatusCode::CREATED, Json(experience)))
}

async fn update_experience_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(experience_id): Path<i32>,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<experience::Model>, AppError> {
    let experience = services::update_experience(
        &app_state.db_pool,
        &authenticated_user.actor(),
        experience_id,
        payload,
    )
    .await?;
    Ok(Json(experience))
}

async fn delete_experience_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(experience_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_experience(&app_state.db_pool, &authenticated_user.actor(), experience_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_profile_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_profile_handler).put(update_profile_handler))
        .route(
            "/experiences",
            get(list_experiences_handler).post(add_experience_handler),
        )
        .route(
            "/experiences/{id}",
            put(update_experience_handler).delete(delete_experience_handler),
        )
}
