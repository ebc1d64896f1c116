//! This module defines the services that are exposed by this crate

use uuid::Uuid;

use crate::domain::{
    models::{
        ListPropertyDefinitionsParams, PropertyDefinition, PropertyDefinitionErr,
        PropertyDefinitionFilters, PropertyDefinitionView, TeamId,
    },
    ports::{PropertyDefinitionRepo, PropertyDefinitionService, PropertyTagRepo},
    query::PropertyDefinitionQuery,
};


/// concrete struct which implements [PropertyDefinitionService]
#[derive(Clone)]
pub struct PropertyDefinitionServiceImpl<R, T> {
    /// the interface for reading definitions
    definitions: R,
    /// the interface for reading tags
    tags: T,
}

impl<R, T> PropertyDefinitionServiceImpl<R, T>
where
    R: PropertyDefinitionRepo,
    anyhow::Error: From<R::Err>,
    T: PropertyTagRepo,
    anyhow::Error: From<T::Err>,
{
    /// create a new instance of this service
    pub fn new(definitions: R, tags: T) -> Self {
        PropertyDefinitionServiceImpl { definitions, tags }
    }

    async fn attach_tags(
        &self,
        team_id: TeamId,
        definitions: Vec<PropertyDefinition>,
    ) -> Result<Vec<PropertyDefinitionView>, PropertyDefinitionErr> {
        if definitions.is_empty() {
            return Ok(Vec::new());
        }

        let mut tags = self
            .tags
            .get_tags_for_definitions(team_id, definitions.iter().map(|d| d.id).collect())
            .await
            .map_err(anyhow::Error::from)?;

        Ok(definitions
            .into_iter()
            .map(|definition| {
                let mut names = tags.remove(&definition.id).unwrap_or_default();
                names.sort();
                PropertyDefinitionView::new(definition, names)
            })
            .collect())
    }
}

impl<R, T> PropertyDefinitionService for PropertyDefinitionServiceImpl<R, T>
where
    R: PropertyDefinitionRepo,
    anyhow::Error: From<R::Err>,
    T: PropertyTagRepo,
    anyhow::Error: From<T::Err>,
{
    #[tracing::instrument(err(Debug), skip(self))]
    async fn list(
        &self,
        team_id: TeamId,
        params: ListPropertyDefinitionsParams,
    ) -> Result<Vec<PropertyDefinitionView>, PropertyDefinitionErr> {
        let filters = PropertyDefinitionFilters::try_from(params)?;
        let query = PropertyDefinitionQuery::compose(team_id, &filters);

        let definitions = self
            .definitions
            .list_property_definitions(query)
            .await
            .map_err(anyhow::Error::from)?;

        tracing::debug!(count = definitions.len(), "listed property definitions");

        self.attach_tags(team_id, definitions).await
    }

    #[tracing::instrument(err(Debug), skip(self))]
    async fn retrieve(
        &self,
        team_id: TeamId,
        id: Uuid,
    ) -> Result<PropertyDefinitionView, PropertyDefinitionErr> {
        let definition = self
            .definitions
            .get_property_definition(team_id, id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or(PropertyDefinitionErr::NotFound(id))?;

        self.attach_tags(team_id, vec![definition])
            .await?
            .pop()
            .ok_or(PropertyDefinitionErr::NotFound(id))
    }

    #[tracing::instrument(err(Debug), skip(self, _payload))]
    async fn create(
        &self,
        team_id: TeamId,
        _payload: serde_json::Value,
    ) -> Result<PropertyDefinitionView, PropertyDefinitionErr> {
        Err(PropertyDefinitionErr::Unsupported)
    }

    #[tracing::instrument(err(Debug), skip(self, _payload))]
    async fn update(
        &self,
        team_id: TeamId,
        id: Uuid,
        _payload: serde_json::Value,
    ) -> Result<PropertyDefinitionView, PropertyDefinitionErr> {
        Err(PropertyDefinitionErr::FeatureGated)
    }
}
