use anyhow::Context;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use property_definitions::{
    domain::ports::PropertyDefinitionService,
    inbound::axum_router::{PropertyDefinitionsRouterState, property_definitions_router},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

mod health;
pub mod swagger;


fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_headers(vec![AUTHORIZATION, CONTENT_TYPE])
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
}

fn app<T>(service: T) -> Router
where
    T: PropertyDefinitionService,
{
    property_definitions_router(PropertyDefinitionsRouterState::new(service))
        .layer(TraceLayer::new_for_http())
        .merge(health::router())
        .layer(cors_layer())
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", swagger::ApiDoc::openapi()))
}

pub async fn setup_and_serve<T>(config: Config, service: T) -> anyhow::Result<()>
where
    T: PropertyDefinitionService,
{
    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind to address {}", bind_address))?;

    tracing::info!(
        "property definitions service is up and running with environment {} on port {}",
        config.environment,
        config.port
    );

    axum::serve(listener, app(service).into_make_service())
        .await
        .context("error running axum server")
}
