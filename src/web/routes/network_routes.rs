use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::{ConnectedUser, ConnectionProfile};
use crate::db::services;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

async fn list_connections_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConnectedUser>>, AppError> {
    let connections = services::list_connections(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(connections))
}

async fn connection_profile_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ConnectionProfile>, AppError> {
    let profile = services::get_connection_profile(
        &app_state.db_pool,
        &authenticated_user.actor(),
        user_id,
    )
    .await?;
    Ok(Json(profile))
}

async fn remove_connection_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state
        .match_service
        .remove_connection(authenticated_user.id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_network_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_connections_handler))
        .route(
            "/{user_id}",
            get(connection_profile_handler).delete(remove_connection_handler),
        )
}
