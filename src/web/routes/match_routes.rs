use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::entities::match_request;
use crate::db::models::{MatchedProject, OrganizationMatchRequest};
use crate::web::models::{AuthenticatedUser, RespondMatchRequest};
use crate::web::{AppError, AppState};

async fn freelancer_matches_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<MatchedProject>>, AppError> {
    let matches = app_state
        .match_service
        .list_matches_for_freelancer(&authenticated_user.actor())
        .await?;
    Ok(Json(matches))
}

async fn organization_matches_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrganizationMatchRequest>>, AppError> {
    let requests = app_state
        .match_service
        .list_matches_for_organization(&authenticated_user.actor())
        .await?;
    Ok(Json(requests))
}

async fn request_match_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<Json<match_request::Model>, AppError> {
    let request = app_state
        .match_service
        .request_match(&authenticated_user.actor(), project_id)
        .await?;
    Ok(Json(request))
}

async fn respond_to_match_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(request_id): Path<i32>,
    Json(payload): Json<RespondMatchRequest>,
) -> Result<Json<match_request::Model>, AppError> {
    let request = app_state
        .match_service
        .respond_to_match(&authenticated_user.actor(), request_id, payload.action)
        .await?;
    Ok(Json(request))
}

pub fn create_matches_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/freelancer", get(freelancer_matches_handler))
        .route("/organization", get(organization_matches_handler))
        .route("/projects/{project_id}/request", post(request_match_handler))
        .route("/requests/{id}/respond", post(respond_to_match_handler))
}
