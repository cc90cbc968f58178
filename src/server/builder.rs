//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::CourseState;
use super::router::{build_course_routes, health_routes};
use crate::config::AppConfig;
use crate::core::service::CourseService;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builder for the course API server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_service(InMemoryCourseService::new())
///     .with_config(config)
///     .build()?;
/// ```
pub struct ServerBuilder {
    service: Option<Arc<dyn CourseService>>,
    config: AppConfig,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            service: None,
            config: AppConfig::default(),
        }
    }

    /// Set the course storage service (required)
    pub fn with_service(mut self, service: impl CourseService + 'static) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    /// Set a storage service that is already shared elsewhere
    pub fn with_shared_service(mut self, service: Arc<dyn CourseService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Use the given configuration for pagination, links and binding
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the state shared by course handlers
    pub fn build_state(&self) -> Result<CourseState> {
        let service = self
            .service
            .clone()
            .ok_or_else(|| anyhow!("CourseService is required. Call .with_service()"))?;

        Ok(CourseState {
            service,
            pagination: self.config.pagination,
            public_url: self.config.server.public_url.clone(),
        })
    }

    /// Build the final router
    ///
    /// Health check and course CRUD routes, with request tracing applied to
    /// both.
    pub fn build(self) -> Result<Router> {
        let state = self.build_state()?;
        let app = health_routes().merge(build_course_routes(state));

        Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to `server.host:server.port`
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Close the storage service once the server has stopped
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_service(service)
    ///     .with_config(config)
    ///     .serve().await?;
    /// ```
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind_addr()?;
        let service = self.build_state()?.service;
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        service.close().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
///
/// A signal whose handler cannot be installed is logged and never fires.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
