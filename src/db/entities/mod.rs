//! SeaORM Entity Crate
//!
//! Defines the SeaORM entities that map to database tables.
//! Each entity is defined in its own module (e.g., `user.rs`, `project.rs`).

pub mod connection;
pub mod experience;
pub mod match_request;
pub mod post;
pub mod profile;
pub mod profile_skill;
pub mod project;
pub mod project_collaborator;
pub mod project_skill;
pub mod tag;
pub mod user;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::profile::Entity as Profile;
    pub use super::profile::Model as ProfileModel;
    pub use super::profile::ActiveModel as ProfileActiveModel;
    pub use super::profile::Column as ProfileColumn;

    pub use super::experience::Entity as Experience;
    pub use super::experience::Model as ExperienceModel;
    pub use super::experience::ActiveModel as ExperienceActiveModel;
    pub use super::experience::Column as ExperienceColumn;

    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;

    pub use super::profile_skill::Entity as ProfileSkill;
    pub use super::profile_skill::Model as ProfileSkillModel;
    pub use super::profile_skill::ActiveModel as ProfileSkillActiveModel;
    pub use super::profile_skill::Column as ProfileSkillColumn;

    pub use super::project::Entity as Project;
    pub use super::project::Model as ProjectModel;
    pub use super::project::ActiveModel as ProjectActiveModel;
    pub use super::project::Column as ProjectColumn;

    pub use super::project_skill::Entity as ProjectSkill;
    pub use super::project_skill::Model as ProjectSkillModel;
    pub use super::project_skill::ActiveModel as ProjectSkillActiveModel;
    pub use super::project_skill::Column as ProjectSkillColumn;

    pub use super::project_collaborator::Entity as ProjectCollaborator;
    pub use super::project_collaborator::Model as ProjectCollaboratorModel;
    pub use super::project_collaborator::ActiveModel as ProjectCollaboratorActiveModel;
    pub use super::project_collaborator::Column as ProjectCollaboratorColumn;

    pub use super::match_request::Entity as MatchRequest;
    pub use super::match_request::Model as MatchRequestModel;
    pub use super::match_request::ActiveModel as MatchRequestActiveModel;
    pub use super::match_request::Column as MatchRequestColumn;

    pub use super::connection::Entity as Connection;
    pub use super::connection::Model as ConnectionModel;
    pub use super::connection::ActiveModel as ConnectionActiveModel;
    pub use super::connection::Column as ConnectionColumn;

    pub use super::post::Entity as Post;
    pub use super::post::Model as PostModel;
    pub use super::post::ActiveModel as PostActiveModel;
    pub use super::post::Column as PostColumn;
}
