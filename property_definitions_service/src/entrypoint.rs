//! Process wide initialisation shared by every run of the service

use tracing_subscriber::EnvFilter;

use crate::config::Environment;

/// proof that [init] was called
#[derive(Debug)]
pub struct InitializedEntrypoint(());

/// load `.env`, then install the panic hook and the tracing subscriber for the current [Environment]
pub fn init() -> InitializedEntrypoint {
    dotenv::dotenv().ok();
    std::panic::set_hook(Box::new(tracing_panic::panic_hook));

    match Environment::new_or_prod() {
        Environment::Local => {
            tracing_subscriber::fmt()
                .with_ansi(true)
                .with_env_filter(EnvFilter::from_default_env())
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .init();
        }
        Environment::Production | Environment::Develop => {
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_env_filter(EnvFilter::from_default_env())
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .init();
        }
    }

    InitializedEntrypoint(())
}
