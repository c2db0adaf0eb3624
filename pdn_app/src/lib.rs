use figment::{Figment, providers::Env};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read configuration: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("Failed to build application context: {0}")]
    Context(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait ContextProvider<Config>: Sized {
    fn new(config: Config) -> impl Future<Output = Result<Self, AppError>>;
}

/// Install the JSON log formatter used by every dashboard binary.
///
/// The level is taken from `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();
}

/// Extract a typed configuration from the raw environment variables.
///
/// # Errors
///
/// If a required variable is missing or cannot be converted into the
/// field's type.
pub fn load_config<'a, Config: serde::Deserialize<'a>>()
-> Result<Config, AppError> {
    extract_config(Figment::new().merge(Env::raw()))
}

fn extract_config<'a, Config: serde::Deserialize<'a>>(
    figment: Figment,
) -> Result<Config, AppError> {
    figment.extract().map_err(|e| AppError::Config(Box::new(e)))
}

/// Initialize tracing, load the configuration from environment variables
/// and build the application context from it.
///
/// # Errors
///
/// If the configuration cannot be extracted from the environment variables
/// or if the context rejects it.
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, AppError>
where
    A: ContextProvider<Config>,
{
    init_tracing();

    let config: Config = load_config()?;

    tracing::debug!("configuration loaded");

    A::new(config).await
}
