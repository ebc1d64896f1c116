//! This module provides the implementation for reading property definitions from postgres

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::{PgPool, prelude::FromRow};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    models::{PropertyDefinition, PropertyType, TeamId},
    ports::{PropertyDefinitionRepo, PropertyTagRepo},
    query::PropertyDefinitionQuery,
};

mod dynamic;


/// The migrations which create the tables read by [PropertyDefinitionPgStorage]
pub static PROPERTY_DEFINITIONS_MIGRATIONS: sqlx::migrate::Migrator =
    sqlx::migrate!("./migrations");

/// Concrete implementation of storage ports against a postgres instance
#[derive(Debug, Clone)]
pub struct PropertyDefinitionPgStorage {
    pool: PgPool,
}

/// the types of errors that can occur on [PropertyDefinitionPgStorage]
#[derive(Debug, Error)]
pub enum PropertyDefinitionStorageErr {
    /// there was a sqlx error
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    /// the database contained a property type we do not recognise
    #[error("unknown property type {0:?}")]
    UnknownPropertyType(String),
}

impl PropertyDefinitionPgStorage {
    /// create a new instance of Self
    pub fn new(pool: PgPool) -> Self {
        PropertyDefinitionPgStorage { pool }
    }
}

/// The columns selected for every property definition read
#[derive(Debug, FromRow)]
struct PropertyDefinitionRow {
    id: Uuid,
    team_id: i64,
    name: String,
    is_numerical: bool,
    query_usage_30_day: Option<i64>,
    property_type: Option<String>,
    is_event_property: Option<bool>,
}

impl TryFrom<PropertyDefinitionRow> for PropertyDefinition {
    type Error = PropertyDefinitionStorageErr;

    fn try_from(row: PropertyDefinitionRow) -> Result<Self, Self::Error> {
        let property_type = row
            .property_type
            .map(|raw| {
                PropertyType::from_str(&raw)
                    .map_err(|_| PropertyDefinitionStorageErr::UnknownPropertyType(raw))
            })
            .transpose()?;

        Ok(PropertyDefinition {
            id: row.id,
            team_id: row.team_id,
            name: row.name,
            is_numerical: row.is_numerical,
            query_usage_30_day: row.query_usage_30_day,
            property_type,
            is_event_property: row.is_event_property,
        })
    }
}

impl PropertyDefinitionRepo for PropertyDefinitionPgStorage {
    type Err = PropertyDefinitionStorageErr;

    #[tracing::instrument(err, skip(self))]
    async fn list_property_definitions(
        &self,
        query: PropertyDefinitionQuery,
    ) -> Result<Vec<PropertyDefinition>, Self::Err> {
        dynamic::dynamic_list_property_definitions(&self.pool, query).await
    }

    #[tracing::instrument(err, skip(self))]
    async fn get_property_definition(
        &self,
        team_id: TeamId,
        id: Uuid,
    ) -> Result<Option<PropertyDefinition>, Self::Err> {
        let row = sqlx::query_as::<_, PropertyDefinitionRow>(
            r#"
            SELECT id, team_id, name, is_numerical, query_usage_30_day, property_type,
                   NULL::boolean AS is_event_property
            FROM posthog_propertydefinition
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PropertyDefinition::try_from).transpose()
    }
}

impl PropertyTagRepo for PropertyDefinitionPgStorage {
    type Err = PropertyDefinitionStorageErr;

    #[tracing::instrument(err, skip(self, ids), fields(definitions = ids.len()))]
    async fn get_tags_for_definitions(
        &self,
        team_id: TeamId,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<String>>, Self::Err> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT ti.property_definition_id, t.name
            FROM posthog_taggeditem ti
            INNER JOIN posthog_tag t ON t.id = ti.tag_id
            WHERE t.team_id = $1 AND ti.property_definition_id = ANY($2)
            ORDER BY t.name ASC
            "#,
        )
        .bind(team_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .fold(HashMap::new(), |mut acc, (definition_id, tag)| {
                acc.entry(definition_id).or_insert_with(Vec::new).push(tag);
                acc
            }))
    }
}
