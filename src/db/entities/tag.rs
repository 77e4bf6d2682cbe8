use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Skill label shared by profiles and projects.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        super::profile_skill::Relation::Profile.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::profile_skill::Relation::Tag.def().rev())
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_skill::Relation::Project.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::project_skill::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
