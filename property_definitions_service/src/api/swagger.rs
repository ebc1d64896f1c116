use property_definitions::{
    domain::models::{PropertyDefinitionView, PropertyType},
    inbound::axum_router::{self, ErrorResponse},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        axum_router::list_property_definitions_handler,
        axum_router::retrieve_property_definition_handler,
        axum_router::create_property_definition_handler,
        axum_router::update_property_definition_handler,
    ),
    components(
        schemas(
            PropertyDefinitionView,
            PropertyType,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Property definitions", description = "Listing and retrieving the property definitions of a team")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_document_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert_eq!(
            paths,
            vec![
                "/api/projects/{team_id}/property_definitions",
                "/api/projects/{team_id}/property_definitions/{id}",
            ]
        );
    }
}
