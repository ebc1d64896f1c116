use anyhow::Context;
use config::Config;
use property_definitions::{
    domain::service::PropertyDefinitionServiceImpl,
    outbound::postgres::{PROPERTY_DEFINITIONS_MIGRATIONS, PropertyDefinitionPgStorage},
};
use sqlx::postgres::PgPoolOptions;

mod api;
mod config;
mod entrypoint;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    entrypoint::init();

    let config = Config::from_env().context("expected to be able to generate config")?;

    tracing::info!(environment = %config.environment, "initialized config");

    let db = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("could not connect to db")?;

    tracing::info!(
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "initialized db connection"
    );

    PROPERTY_DEFINITIONS_MIGRATIONS
        .run(&db)
        .await
        .context("failed to run migrations")?;

    tracing::info!("applied migrations");

    let storage = PropertyDefinitionPgStorage::new(db);
    let service = PropertyDefinitionServiceImpl::new(storage.clone(), storage);

    api::setup_and_serve(config, service).await
}
