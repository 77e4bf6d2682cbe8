//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates the query logic and transaction boundaries, so the HTTP handlers
//! work with domain models without knowing the underlying schema.
//!
//! Each sub-module covers one area (users, profiles, projects, matches, ...). All public
//! items are re-exported here for access under the `crate::db::services::` path.

pub mod admin_service;
pub mod error;
pub mod experience_service;
pub mod match_service;
pub mod network_service;
pub mod post_service;
pub mod profile_service;
pub mod project_service;
pub mod tag_service;
pub mod user_service;

pub use admin_service::*;
pub use error::ServiceError;
pub use experience_service::*;
pub use match_service::{MatchAction, MatchService};
pub use network_service::*;
pub use post_service::*;
pub use profile_service::*;
pub use project_service::*;
pub use tag_service::*;
pub use user_service::*;
