//! Creates the tables from the entity definitions.
//!
//! Every statement is `IF NOT EXISTS`, so running this against an already
//! initialized database is a no-op. Tables are created parents first so the
//! foreign keys resolve.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::db::entities::{match_request, prelude::*};

pub const MATCH_REQUEST_UNIQUE_INDEX: &str = "idx_match_requests_freelancer_project";

pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Profile).await?;
    create_table(db, &schema, Experience).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, ProfileSkill).await?;
    create_table(db, &schema, Project).await?;
    create_table(db, &schema, ProjectSkill).await?;
    create_table(db, &schema, ProjectCollaborator).await?;
    create_table(db, &schema, MatchRequest).await?;
    create_table(db, &schema, Connection).await?;
    create_table(db, &schema, Post).await?;

    // A freelancer may hold at most one request per project.
    let index = Index::create()
        .name(MATCH_REQUEST_UNIQUE_INDEX)
        .table(MatchRequest)
        .col(match_request::Column::FreelancerId)
        .col(match_request::Column::ProjectId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(db.get_database_backend().build(&index)).await?;

    info!("Database schema is up to date.");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}
