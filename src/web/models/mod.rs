use serde::{Deserialize, Serialize};

use crate::db::enums::{ProjectStatus, UserRole};
use crate::db::models::Actor;
use crate::db::services::MatchAction;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub user_type: UserRole,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub user_type: UserRole,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub user_id: i32,
    pub role: UserRole,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: usize,
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role,
            is_admin: self.is_admin,
        }
    }
}

/// Profile update. Absent fields are left unchanged, blank strings clear the field.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub company_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    /// Replaces the whole skill set when present.
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub description: String,
    pub terms_of_contract: String,
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RespondMatchRequest {
    pub action: MatchAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRequest {
    pub organization: String,
    pub role: String,
    pub years: f64,
    pub details: Option<String>,
}
