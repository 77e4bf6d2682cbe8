use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::ProjectStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning organization's profile.
    pub profile_id: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub terms_of_contract: String,
    pub status: ProjectStatus,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Profile,

    #[sea_orm(has_many = "super::match_request::Entity")]
    MatchRequests,

    #[sea_orm(has_many = "super::project_collaborator::Entity")]
    Collaborators,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::match_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchRequests.def()
    }
}

impl Related<super::project_collaborator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collaborators.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_skill::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::project_skill::Relation::Project.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
