use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::{experience, match_request, post, profile, project};
use crate::db::enums::{MatchStatus, UserRole};

/// The user an operation is performed on behalf of.
///
/// Services never read identity from ambient state; the web layer builds an
/// `Actor` from the verified token and passes it down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: UserRole,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            is_admin: false,
        }
    }
}

/// Input for creating a user (and its empty profile).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_admin: bool,
}

/// A project whose required skills overlap a freelancer's skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedProject {
    pub project: project::Model,
    pub required_skills: Vec<String>,
    pub company_name: Option<String>,
    /// The freelancer's own request status, `None` if they never asked.
    pub match_status: Option<MatchStatus>,
}

/// A request as seen by the organization owning the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMatchRequest {
    pub request: match_request::Model,
    pub freelancer_email: String,
    pub freelancer_name: String,
    pub project_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedUser {
    pub user_id: i32,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub company_name: Option<String>,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub user_id: i32,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub profile: profile::Model,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub project: project::Model,
    pub required_skills: Vec<String>,
    pub collaborator_ids: Vec<i32>,
}

/// What a user sees when opening one of their connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    pub details: ProfileDetails,
    pub posts: Vec<post::Model>,
    /// Work history, only filled for freelancers.
    pub experiences: Vec<experience::Model>,
    /// Organization projects not shared with the viewer.
    pub projects: Vec<project::Model>,
    /// Projects linking the viewer and the target (owner + collaborator).
    pub collaborations: Vec<project::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthor {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_full_name: String,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub freelancers: u64,
    pub organizations: u64,
    pub projects: u64,
    pub posts: u64,
    pub matches: u64,
}
