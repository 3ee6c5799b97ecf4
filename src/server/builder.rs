//! ServerBuilder for fluent API to build the admin HTTP server

use crate::core::error::GridResult;
use crate::dataset::registry::{DatasetDescriptor, DatasetRegistry};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating the admin server with auto-registered routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .register_dataset(Box::new(ProductDescriptor::new(state)))
///     .build()?;
/// ```
pub struct ServerBuilder {
    registry: DatasetRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            registry: DatasetRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Register a dataset descriptor
    pub fn register_dataset(mut self, descriptor: Box<dyn DatasetDescriptor>) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes that don't fit the dataset pattern, such as
    /// authentication endpoints or webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// Merges health routes, every registered dataset's routes, and any
    /// custom routes, then applies tracing and CORS layers.
    pub fn build(self) -> GridResult<Router> {
        let mut app = Self::health_routes().merge(self.registry.build_routes());

        for custom in self.custom_routes {
            app = app.merge(custom);
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds the address, serves requests, and handles SIGTERM and
    /// Ctrl+C for graceful shutdown.
    pub async fn serve(self, addr: &str) -> GridResult<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/healthz", get(health_check))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gridset"
    }))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
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
