//! This module exposes the property definitions resource over http via axum

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    models::{
        ListPropertyDefinitionsParams, PropertyDefinitionErr, PropertyDefinitionView, TeamId,
    },
    ports::PropertyDefinitionService,
};

#[cfg(test)]
mod tests;

/// The route of the collection
pub const PROPERTY_DEFINITIONS_PATH: &str = "/api/projects/:team_id/property_definitions";

/// The route of a single item in the collection
pub const PROPERTY_DEFINITION_PATH: &str = "/api/projects/:team_id/property_definitions/:id";

/// Query parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Comma separated list of exact property names to return.
    #[serde(default)]
    properties: Option<String>,
    /// `true` returns only numerical properties.
    #[serde(default)]
    is_numerical: Option<String>,
    /// JSON list of event names. Enables the `is_event_property` column.
    #[serde(default)]
    event_names: Option<String>,
    /// `true` or `false`. Filters on `is_event_property`, requires `event_names`.
    #[serde(default)]
    is_event_property: Option<String>,
    /// JSON list of property names to exclude.
    #[serde(default)]
    excluded_properties: Option<String>,
    /// Free text search on the property name.
    #[serde(default)]
    search: Option<String>,
    /// Max number of rows to return.
    #[serde(default)]
    limit: Option<u32>,
    /// Number of rows to skip.
    #[serde(default)]
    offset: Option<u32>,
}

impl From<ListParams> for ListPropertyDefinitionsParams {
    fn from(params: ListParams) -> Self {
        let ListParams {
            properties,
            is_numerical,
            event_names,
            is_event_property,
            excluded_properties,
            search,
            limit,
            offset,
        } = params;

        ListPropertyDefinitionsParams {
            properties,
            is_numerical,
            event_names,
            is_event_property,
            excluded_properties,
            search,
            limit,
            offset,
        }
    }
}

/// A json error response with a stable machine readable code
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse<'a> {
    /// Stable identifier of the failure
    pub code: &'a str,
    /// Message to explain failure
    pub message: &'a str,
}

/// Shared state of the property definitions router
pub struct PropertyDefinitionsRouterState<T> {
    service: Arc<T>,
}

impl<T> Clone for PropertyDefinitionsRouterState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<T> PropertyDefinitionsRouterState<T>
where
    T: PropertyDefinitionService,
{
    /// wrap the input service so it can be shared between requests
    pub fn new(service: T) -> Self {
        PropertyDefinitionsRouterState {
            service: Arc::new(service),
        }
    }
}

/// Build the router for the property definitions resource
pub fn property_definitions_router<T, S>(state: PropertyDefinitionsRouterState<T>) -> Router<S>
where
    T: PropertyDefinitionService,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            PROPERTY_DEFINITIONS_PATH,
            get(list_property_definitions_handler::<T>)
                .post(create_property_definition_handler::<T>),
        )
        .route(
            PROPERTY_DEFINITION_PATH,
            get(retrieve_property_definition_handler::<T>)
                .patch(update_property_definition_handler::<T>)
                .put(update_property_definition_handler::<T>),
        )
        .with_state(state)
}

impl IntoResponse for PropertyDefinitionErr {
    fn into_response(self) -> Response {
        let (status_code, code) = match &self {
            PropertyDefinitionErr::Parse(_) => (StatusCode::BAD_REQUEST, "parse_error"),
            PropertyDefinitionErr::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            PropertyDefinitionErr::FeatureGated => {
                (StatusCode::PAYMENT_REQUIRED, "payment_required")
            }
            PropertyDefinitionErr::Unsupported => {
                (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed")
            }
            PropertyDefinitionErr::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = if status_code.is_server_error() {
            tracing::error!(
                error = ?self,
                error_type = "PropertyDefinitionErr",
                "Internal server error"
            );
            "An internal server error has occurred".to_string()
        } else {
            if let PropertyDefinitionErr::Parse(e) = &self {
                tracing::warn!(error = %e, "rejected list parameters");
            }
            self.to_string()
        };

        (
            status_code,
            Json(ErrorResponse {
                code,
                message: &message,
            }),
        )
            .into_response()
    }
}

/// List the property definitions of a team
#[utoipa::path(
    get,
    operation_id = "list_property_definitions",
    path = "/api/projects/{team_id}/property_definitions",
    params(
        ("team_id" = i64, Path, description = "The team which owns the property definitions"),
        ListParams,
    ),
    responses(
        (status = 200, body = Vec<PropertyDefinitionView>),
        (status = 400, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    ),
    tag = "Property definitions"
)]
#[tracing::instrument(skip(state))]
pub async fn list_property_definitions_handler<T>(
    State(state): State<PropertyDefinitionsRouterState<T>>,
    Path(team_id): Path<TeamId>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PropertyDefinitionView>>, PropertyDefinitionErr>
where
    T: PropertyDefinitionService,
{
    let definitions = state.service.list(team_id, params.into()).await?;

    tracing::info!(
        team_id,
        properties_count = definitions.len(),
        "successfully listed property definitions"
    );

    Ok(Json(definitions))
}

/// Get a single property definition of a team
#[utoipa::path(
    get,
    operation_id = "retrieve_property_definition",
    path = "/api/projects/{team_id}/property_definitions/{id}",
    params(
        ("team_id" = i64, Path, description = "The team which owns the property definition"),
        ("id" = Uuid, Path, description = "Property definition ID"),
    ),
    responses(
        (status = 200, body = PropertyDefinitionView),
        (status = 404, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    ),
    tag = "Property definitions"
)]
#[tracing::instrument(skip(state))]
pub async fn retrieve_property_definition_handler<T>(
    State(state): State<PropertyDefinitionsRouterState<T>>,
    Path((team_id, id)): Path<(TeamId, Uuid)>,
) -> Result<Json<PropertyDefinitionView>, PropertyDefinitionErr>
where
    T: PropertyDefinitionService,
{
    Ok(Json(state.service.retrieve(team_id, id).await?))
}

/// Property definitions cannot be created through this api
#[utoipa::path(
    post,
    operation_id = "create_property_definition",
    path = "/api/projects/{team_id}/property_definitions",
    params(
        ("team_id" = i64, Path, description = "The team which owns the property definitions"),
    ),
    responses(
        (status = 405, body = ErrorResponse),
    ),
    tag = "Property definitions"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn create_property_definition_handler<T>(
    State(state): State<PropertyDefinitionsRouterState<T>>,
    Path(team_id): Path<TeamId>,
    payload: Option<Json<serde_json::Value>>,
) -> Result<Json<PropertyDefinitionView>, PropertyDefinitionErr>
where
    T: PropertyDefinitionService,
{
    let payload = payload.map(|Json(v)| v).unwrap_or_default();
    Ok(Json(state.service.create(team_id, payload).await?))
}

/// Editing property definitions requires the enterprise edition.
/// The body is never inspected.
#[utoipa::path(
    patch,
    operation_id = "update_property_definition",
    path = "/api/projects/{team_id}/property_definitions/{id}",
    params(
        ("team_id" = i64, Path, description = "The team which owns the property definition"),
        ("id" = Uuid, Path, description = "Property definition ID"),
    ),
    responses(
        (status = 402, body = ErrorResponse),
    ),
    tag = "Property definitions"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn update_property_definition_handler<T>(
    State(state): State<PropertyDefinitionsRouterState<T>>,
    Path((team_id, id)): Path<(TeamId, Uuid)>,
    payload: Option<Json<serde_json::Value>>,
) -> Result<Json<PropertyDefinitionView>, PropertyDefinitionErr>
where
    T: PropertyDefinitionService,
{
    let payload = payload.map(|Json(v)| v).unwrap_or_default();
    Ok(Json(state.service.update(team_id, id, payload).await?))
}
