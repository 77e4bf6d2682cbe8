use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::db::entities::tag;

// --- Tag Service Functions ---

/// Trims, drops blanks and collapses duplicates, keeping first-seen order.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for name in names {
        let trimmed = name.as_ref().trim();
        if !trimmed.is_empty() && !normalized.iter().any(|n| n == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

/// Lists every tag, alphabetically.
pub async fn list_tags<C: ConnectionTrait>(db: &C) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
}

/// Resolves tag names to rows, creating the missing ones.
/// Ignores conflicts when a concurrent caller created the same tag.
pub async fn get_or_create_tags<C, S>(db: &C, names: &[S]) -> Result<Vec<tag::Model>, DbErr>
where
    C: ConnectionTrait,
    S: AsRef<str>,
{
    let names = normalize_tag_names(names);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let new_tags = names.iter().map(|name| tag::ActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    });
    tag::Entity::insert_many(new_tags)
        .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    tag::Entity::find()
        .filter(tag::Column::Name.is_in(names))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
}
