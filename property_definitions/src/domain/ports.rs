//! This module defines all of the ports that the property definitions domain requires

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{
    models::{
        ListPropertyDefinitionsParams, PropertyDefinition, PropertyDefinitionErr,
        PropertyDefinitionView, TeamId,
    },
    query::PropertyDefinitionQuery,
};

/// Trait for reading property definitions from storage
#[cfg_attr(any(test, feature = "mock"), mockall::automock(type Err = anyhow::Error;))]
pub trait PropertyDefinitionRepo: Send + Sync + 'static {
    /// the error type that can occur
    type Err: Send;

    /// execute a composed [PropertyDefinitionQuery] and return the rows in query order
    fn list_property_definitions(
        &self,
        query: PropertyDefinitionQuery,
    ) -> impl Future<Output = Result<Vec<PropertyDefinition>, Self::Err>> + Send;

    /// fetch a single definition by id, only if it belongs to the input team
    fn get_property_definition(
        &self,
        team_id: TeamId,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<PropertyDefinition>, Self::Err>> + Send;
}

/// Trait for reading the tags attached to property definitions
#[cfg_attr(any(test, feature = "mock"), mockall::automock(type Err = anyhow::Error;))]
pub trait PropertyTagRepo: Send + Sync + 'static {
    /// the error type that can occur
    type Err: Send;

    /// fetch the tag names for each of the input definitions.
    /// Definitions without tags may be absent from the output map.
    fn get_tags_for_definitions(
        &self,
        team_id: TeamId,
        ids: Vec<Uuid>,
    ) -> impl Future<Output = Result<HashMap<Uuid, Vec<String>>, Self::Err>> + Send;
}

/// The operations exposed on the property definitions resource.
/// Create and update keep their place in the interface but are never carried out.
pub trait PropertyDefinitionService: Send + Sync + 'static {
    /// list the definitions of a team matching the input parameters
    fn list(
        &self,
        team_id: TeamId,
        params: ListPropertyDefinitionsParams,
    ) -> impl Future<Output = Result<Vec<PropertyDefinitionView>, PropertyDefinitionErr>> + Send;

    /// get a single definition of a team
    fn retrieve(
        &self,
        team_id: TeamId,
        id: Uuid,
    ) -> impl Future<Output = Result<PropertyDefinitionView, PropertyDefinitionErr>> + Send;

    /// always fails with [PropertyDefinitionErr::Unsupported]
    fn create(
        &self,
        team_id: TeamId,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<PropertyDefinitionView, PropertyDefinitionErr>> + Send;

    /// always fails with [PropertyDefinitionErr::FeatureGated]
    fn update(
        &self,
        team_id: TeamId,
        id: Uuid,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<PropertyDefinitionView, PropertyDefinitionErr>> + Send;
}
