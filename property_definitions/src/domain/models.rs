//! Models used by the property definitions domain

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;


/// Identifier of the team which scopes every property definition
pub type TeamId = i64;

/// The type of values a property holds, as detected during ingestion
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "inbound", derive(utoipa::ToSchema))]
pub enum PropertyType {
    /// date or datetime values
    DateTime,
    /// free text values
    String,
    /// integer or floating point values
    Numeric,
    /// true / false values
    Boolean,
}

/// A property definition row as read from storage.
/// `is_event_property` is derived at query time and is [None] unless event names were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// the unique id of this definition
    pub id: Uuid,
    /// the team this definition belongs to
    pub team_id: TeamId,
    /// the property name, unique per team
    pub name: String,
    /// whether the property has only been seen with numerical values
    pub is_numerical: bool,
    /// how many times this property was used in queries in the last 30 days
    pub query_usage_30_day: Option<i64>,
    /// the detected type of the property
    pub property_type: Option<PropertyType>,
    /// whether this property was seen alongside any of the requested events
    pub is_event_property: Option<bool>,
}

/// The projection of a [PropertyDefinition] which is returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "inbound", derive(utoipa::ToSchema))]
pub struct PropertyDefinitionView {
    /// the unique id of this definition
    pub id: Uuid,
    /// the property name
    pub name: String,
    /// whether the property is numerical
    pub is_numerical: bool,
    /// number of queries using this property in the last 30 days
    pub query_usage_30_day: Option<i64>,
    /// the detected type of the property
    pub property_type: Option<PropertyType>,
    /// names of the tags attached to this definition
    pub tags: Vec<String>,
    /// only computed when `event_names` is passed to the list endpoint
    pub is_event_property: Option<bool>,
}

impl PropertyDefinitionView {
    /// attach the input tags to a [PropertyDefinition]
    pub fn new(definition: PropertyDefinition, tags: Vec<String>) -> Self {
        let PropertyDefinition {
            id,
            name,
            is_numerical,
            query_usage_30_day,
            property_type,
            is_event_property,
            ..
        } = definition;

        PropertyDefinitionView {
            id,
            name,
            is_numerical,
            query_usage_30_day,
            property_type,
            tags,
            is_event_property,
        }
    }
}

/// The unparsed list parameters exactly as the caller supplied them
#[derive(Debug, Clone, Default)]
pub struct ListPropertyDefinitionsParams {
    /// comma separated list of exact names
    pub properties: Option<String>,
    /// `"true"` restricts to numerical properties
    pub is_numerical: Option<String>,
    /// json encoded list of event names
    pub event_names: Option<String>,
    /// `"true"` or `"false"`, filters on the derived column
    pub is_event_property: Option<String>,
    /// json encoded list of names to exclude
    pub excluded_properties: Option<String>,
    /// free text search term
    pub search: Option<String>,
    /// max number of rows to return
    pub limit: Option<u32>,
    /// number of rows to skip
    pub offset: Option<u32>,
}

/// Limit and offset applied after ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// max number of rows to return
    pub limit: Option<u32>,
    /// number of rows to skip
    pub offset: Option<u32>,
}

/// The validated form of [ListPropertyDefinitionsParams].
/// Every json parameter is parsed exactly once here and shared from then on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDefinitionFilters {
    /// restrict to these exact names
    pub names: Option<Vec<String>>,
    /// restrict to numerical properties
    pub numerical_only: bool,
    /// event names used to compute `is_event_property`
    pub event_names: Vec<String>,
    /// requested value of `is_event_property`
    pub is_event_property: Option<bool>,
    /// names excluded by the caller, in addition to the hidden set
    pub excluded_properties: Vec<String>,
    /// free text search term
    pub search: Option<String>,
    /// pagination
    pub page: Page,
}

/// Errors which occur while parsing [ListPropertyDefinitionsParams]
#[derive(Debug, Error)]
pub enum ParseError {
    /// the parameter was not a json list of strings
    #[error("{param} must be a JSON list of strings: {source}")]
    InvalidJsonList {
        /// name of the offending query parameter
        param: &'static str,
        /// the underlying json error
        #[source]
        source: serde_json::Error,
    },
}

/// Empty and `null` inputs are treated as if the parameter was not supplied
fn parse_json_list(param: &'static str, raw: Option<&str>) -> Result<Vec<String>, ParseError> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };

    serde_json::from_str::<Option<Vec<String>>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|source| ParseError::InvalidJsonList { param, source })
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

impl TryFrom<ListPropertyDefinitionsParams> for PropertyDefinitionFilters {
    type Error = ParseError;

    fn try_from(params: ListPropertyDefinitionsParams) -> Result<Self, Self::Error> {
        let event_names = parse_json_list("event_names", params.event_names.as_deref())?;
        let excluded_properties =
            parse_json_list("excluded_properties", params.excluded_properties.as_deref())?;

        let names = params
            .properties
            .filter(|p| !p.is_empty())
            .map(|p| p.split(',').map(str::to_string).collect());

        Ok(PropertyDefinitionFilters {
            names,
            numerical_only: parse_flag(params.is_numerical.as_deref()) == Some(true),
            event_names,
            is_event_property: parse_flag(params.is_event_property.as_deref()),
            excluded_properties,
            search: params.search,
            page: Page {
                limit: params.limit,
                offset: params.offset,
            },
        })
    }
}

/// The error type for every [crate::domain::ports::PropertyDefinitionService] operation
#[derive(Debug, Error)]
pub enum PropertyDefinitionErr {
    /// the caller supplied malformed parameters
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// no definition with this id exists within the team
    #[error("property definition {0} not found")]
    NotFound(Uuid),
    /// editing definitions requires the enterprise edition
    #[error(
        "This feature is part of the premium offering. An enterprise license is required to edit property definitions."
    )]
    FeatureGated,
    /// the operation is not offered on this resource
    #[error("property definitions cannot be created through this api")]
    Unsupported,
    /// the storage layer failed
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
