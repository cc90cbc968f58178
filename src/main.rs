//! Courses API server
//!
//! Usage: `courses-api [config.yaml]`. Without an argument the path is taken
//! from `COURSES_CONFIG`; without either, defaults are used.

use anyhow::Result;
use courses::config::{AppConfig, LoggingConfig, StorageBackend, StorageConfig};
use courses::core::service::CourseService;
use courses::server::ServerBuilder;
use courses::storage::InMemoryCourseService;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COURSES_CONFIG").ok());

    let config = match &config_path {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    };

    init_tracing(&config.logging);

    match &config_path {
        Some(path) => tracing::info!(path = %path, "loaded configuration"),
        None => tracing::info!("no configuration file given, using defaults"),
    }

    let service = open_storage(&config.storage).await?;

    ServerBuilder::new()
        .with_shared_service(service)
        .with_config(config)
        .serve()
        .await
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }
}

async fn open_storage(storage: &StorageConfig) -> Result<Arc<dyn CourseService>> {
    match storage.backend {
        StorageBackend::InMemory => {
            tracing::info!("using in-memory course storage");
            Ok(Arc::new(InMemoryCourseService::new()))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            use anyhow::Context;
            use courses::storage::PostgresCourseService;

            let url = storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;
            let service = PostgresCourseService::connect(url, storage.max_connections).await?;
            service.migrate().await?;
            tracing::info!("using PostgreSQL course storage");
            Ok(Arc::new(service))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("the postgres backend requires building with `--features postgres`")
        }
    }
}
