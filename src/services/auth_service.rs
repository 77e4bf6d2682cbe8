use axum::{Extension, Json, extract::State};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::entities::user;
use crate::db::models::NewUser;
use crate::db::services::{self, ServiceError};
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

const TOKEN_TTL_DAYS: i64 = 7;
const MIN_PASSWORD_LEN: usize = 8;

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn user_response(user: &user::Model) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name(),
        user_type: user.role,
        is_admin: user.is_admin,
    }
}

fn is_listed_admin(email: &str, admin_emails: &[String]) -> bool {
    let email = email.trim().to_lowercase();
    admin_emails.iter().any(|listed| *listed == email)
}

/// Registers a new account. Emails listed in `admin_emails` become administrators.
pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
    admin_emails: &[String],
) -> Result<UserResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(AppError::InvalidInput("Please enter a valid email address.".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if let Some(confirm) = &req.confirm_password {
        if confirm != &req.password {
            return Err(AppError::InvalidInput("Passwords do not match.".to_string()));
        }
    }

    let password_hash = hash(&req.password, HASH_COST)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let is_admin = is_listed_admin(&email, admin_emails);
    let created = services::create_user(
        pool,
        NewUser {
            email,
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            role: req.user_type,
            is_admin,
        },
    )
    .await
    .map_err(|e| match e {
        ServiceError::Conflict(_) => {
            AppError::UserAlreadyExists("An account with this email already exists.".to_string())
        }
        other => other.into(),
    })?;

    Ok(user_response(&created))
}

/// Verifies the password and issues a token. A listed admin email that is not
/// yet flagged is promoted before the token is built.
pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
    admin_emails: &[String],
) -> Result<LoginResponse, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required.".to_string()));
    }

    let mut user = services::get_user_by_email(pool, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;
    if !valid_password {
        warn!(user_id = user.id, "Login rejected: wrong password.");
        return Err(AppError::InvalidCredentials);
    }

    if !user.is_admin && is_listed_admin(&user.email, admin_emails) {
        user = services::grant_admin(pool, user.id).await?;
    }

    info!(user_id = user.id, is_admin = user.is_admin, "User logged in.");
    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(user: &user::Model, jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        role: user.role,
        is_admin: user.is_admin,
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
        user_type: user.role,
    })
}

pub async fn delete_account(pool: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    let deleted = services::delete_user(pool, user_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("User {user_id} not found.")));
    }
    Ok(())
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let current = services::get_user_by_id(&state.db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found.", user.id)))?;
    Ok(Json(user_response(&current)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::UserRole;
    use crate::db::test_support::setup_db;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    const SECRET: &str = "test-secret";

    fn registration(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: Some(password.to_string()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            user_type: UserRole::Freelancer,
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("ada @example.com"));
    }

    #[tokio::test]
    async fn test_register_then_login_issues_token_with_role() {
        let db = setup_db().await;
        let registered = register_user(&db, registration("Ada@Example.com", "correct horse"), &[])
            .await
            .unwrap();
        assert_eq!(registered.email, "ada@example.com");
        assert_eq!(registered.full_name, "Ada Lovelace");

        let login = login_user(
            &db,
            LoginRequest {
                email: "ada@example.com".to_string(),
                password: "correct horse".to_string(),
            },
            SECRET,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(login.user_id, registered.id);

        let claims = decode::<Claims>(
            &login.token,
            &DecodingKey::from_secret(SECRET.as_ref()),
            &Validation::default(),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.user_id, registered.id);
        assert_eq!(claims.role, UserRole::Freelancer);
        assert!(!claims.is_admin);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = setup_db().await;

        let short = register_user(&db, registration("a@example.com", "short"), &[]).await;
        assert!(matches!(short, Err(AppError::InvalidInput(_))));

        let mut mismatch = registration("a@example.com", "long enough");
        mismatch.confirm_password = Some("different".to_string());
        assert!(matches!(register_user(&db, mismatch, &[]).await, Err(AppError::InvalidInput(_))));

        register_user(&db, registration("a@example.com", "long enough"), &[]).await.unwrap();
        let duplicate = register_user(&db, registration("A@example.com", "long enough"), &[]).await;
        assert!(matches!(duplicate, Err(AppError::UserAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_rejected() {
        let db = setup_db().await;
        register_user(&db, registration("a@example.com", "long enough"), &[]).await.unwrap();

        let wrong = login_user(
            &db,
            LoginRequest {
                email: "a@example.com".to_string(),
                password: "not it at all".to_string(),
            },
            SECRET,
            &[],
        )
        .await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = login_user(
            &db,
            LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "long enough".to_string(),
            },
            SECRET,
            &[],
        )
        .await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_listed_admin_email_gets_admin_rights() {
        let db = setup_db().await;
        let admins = vec!["root@example.com".to_string()];

        let root = register_user(&db, registration("Root@Example.com", "long enough"), &admins)
            .await
            .unwrap();
        assert!(root.is_admin);
        let plain = register_user(&db, registration("plain@example.com", "long enough"), &admins)
            .await
            .unwrap();
        assert!(!plain.is_admin);

        let actor = crate::db::models::Actor {
            user_id: root.id,
            role: UserRole::Freelancer,
            is_admin: root.is_admin,
        };
        let stats = services::get_admin_stats(&db, &actor).await.unwrap();
        assert_eq!(stats.total_users, 2);
    }

    #[tokio::test]
    async fn test_login_promotes_existing_account_once_listed() {
        let db = setup_db().await;
        let registered = register_user(&db, registration("late@example.com", "long enough"), &[])
            .await
            .unwrap();
        assert!(!registered.is_admin);

        let login = login_user(
            &db,
            LoginRequest {
                email: "late@example.com".to_string(),
                password: "long enough".to_string(),
            },
            SECRET,
            &["late@example.com".to_string()],
        )
        .await
        .unwrap();

        let claims = decode::<Claims>(
            &login.token,
            &DecodingKey::from_secret(SECRET.as_ref()),
            &Validation::default(),
        )
        .unwrap()
        .claims;
        assert!(claims.is_admin);
        let stored = services::get_user_by_id(&db, registered.id).await.unwrap().unwrap();
        assert!(stored.is_admin);
    }

    #[tokio::test]
    async fn test_delete_account_removes_user() {
        let db = setup_db().await;
        let registered = register_user(&db, registration("a@example.com", "long enough"), &[]).await.unwrap();

        delete_account(&db, registered.id).await.unwrap();
        assert!(matches!(delete_account(&db, registered.id).await, Err(AppError::NotFound(_))));
    }
}
