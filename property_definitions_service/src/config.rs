use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use thiserror::Error;


/// The current environment the application is running in
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Dev and or staging environment
    Develop,
    /// The server is running on localhost
    Local,
}

/// Represents a value which cannot be converted into an [Environment]
#[derive(Debug, Error)]
#[error("Could not convert {0} into an environment value")]
pub struct UnknownValue(String);

impl FromStr for Environment {
    type Err = UnknownValue;

    fn from_str(environment: &str) -> Result<Self, UnknownValue> {
        match environment {
            "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Develop),
            "local" => Ok(Environment::Local),
            s => Err(UnknownValue(s.to_string())),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "prod"),
            Environment::Develop => write!(f, "dev"),
            Environment::Local => write!(f, "local"),
        }
    }
}

impl Environment {
    /// read `ENVIRONMENT`, falling back to production when it is unset or unknown
    pub fn new_or_prod() -> Self {
        std::env::var("ENVIRONMENT")
            .ok()
            .and_then(|v| Environment::from_str(&v).ok())
            .unwrap_or(Environment::Production)
    }

    /// the default pool bounds for this environment
    pub fn pool_size(&self) -> (u32, u32) {
        match self {
            Environment::Production => (5, 30),
            Environment::Develop => (3, 20),
            Environment::Local => (3, 10),
        }
    }
}

/// Configuration parameters for the application.
#[derive(Debug)]
pub struct Config {
    /// The connection URL for the Postgres database holding the property definitions
    pub database_url: String,
    /// The port to listen for HTTP requests on.
    pub port: u16,
    /// The environment we are in
    pub environment: Environment,
    /// Minimum number of pooled database connections
    pub min_connections: u32,
    /// Maximum number of pooled database connections
    pub max_connections: u32,
}

fn optional_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{name} could not be parsed")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("{name} could not be read")),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be provided")?;
        let port = optional_var::<u16>("PORT")?.unwrap_or(8080);
        let environment = Environment::new_or_prod();

        let (default_min, default_max) = environment.pool_size();
        let min_connections =
            optional_var::<u32>("DATABASE_MIN_CONNECTIONS")?.unwrap_or(default_min);
        let max_connections =
            optional_var::<u32>("DATABASE_MAX_CONNECTIONS")?.unwrap_or(default_max);

        anyhow::ensure!(
            min_connections <= max_connections,
            "DATABASE_MIN_CONNECTIONS ({min_connections}) exceeds DATABASE_MAX_CONNECTIONS ({max_connections})"
        );

        Ok(Config {
            database_url,
            port,
            environment,
            min_connections,
            max_connections,
        })
    }
}
