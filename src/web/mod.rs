use axum::{
    Json, Router,
    extract::{Extension, State},
    http::{HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::db::services::MatchService;
use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    middleware::auth,
    models::{AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub match_service: Arc<MatchService>,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user_response =
        auth_service::register_user(&app_state.db_pool, payload, &app_state.config.admin_emails)
            .await?;
    Ok((StatusCode::CREATED, Json(user_response)))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let login_response = auth_service::login_user(
        &app_state.db_pool,
        payload,
        &app_state.config.jwt_secret,
        &app_state.config.admin_emails,
    )
    .await?;

    let auth_cookie = Cookie::build(("token", login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();

    Ok((jar.add(auth_cookie), Json(login_response)))
}

async fn logout_handler(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.remove(Cookie::build("token").path("/")), StatusCode::NO_CONTENT)
}

async fn delete_me_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    auth_service::delete_account(&app_state.db_pool, authenticated_user.id).await?;
    Ok((jar.remove(Cookie::build("token").path("/")), StatusCode::NO_CONTENT))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match config.cors_allow_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS origin in configuration, allowing any origin.");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn create_axum_router(db_pool: DatabaseConnection, config: Arc<ServerConfig>) -> Router {
    let match_service = Arc::new(MatchService::new(Arc::new(db_pool.clone())));
    let cors = cors_layer(&config);

    let app_state = Arc::new(AppState {
        db_pool,
        match_service,
        config,
    });

    let auth_state = app_state.clone();
    let protected = move |router: Router<Arc<AppState>>| {
        router.route_layer(axum_middleware::from_fn_with_state(auth_state.clone(), auth::auth))
    };

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .merge(protected(Router::new().route(
            "/api/auth/me",
            get(auth_service::me).delete(delete_me_handler),
        )))
        .nest("/api/profile", protected(profile_routes::create_profile_router()))
        .nest("/api/tags", protected(tag_routes::create_tags_router()))
        .nest("/api/projects", protected(project_routes::create_projects_router()))
        .nest("/api/matches", protected(match_routes::create_matches_router()))
        .nest("/api/network", protected(network_routes::create_network_router()))
        .nest("/api/posts", protected(post_routes::create_posts_router()))
        .nest("/api/admin", protected(admin_routes::create_admin_router()))
        .with_state(app_state)
        .layer(cors)
}
