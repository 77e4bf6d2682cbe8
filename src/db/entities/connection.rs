use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed edge `user_id -> connected_to_id`. A mutual connection is two rows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub connected_to_id: i32,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade",
        fk_name = "fk_connections_user"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ConnectedToId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade",
        fk_name = "fk_connections_connected_to"
    )]
    ConnectedTo,
}

impl ActiveModelBehavior for ActiveModel {}
