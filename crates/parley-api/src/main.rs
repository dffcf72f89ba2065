//! Parley API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use parley_content::application::repository::InMemoryDefinitionRepository;
use parley_core::clock::SystemClock;
use parley_core::rng::SystemRng;
use parley_gateway::{HttpNpcMessenger, HttpSagaProducer, HttpValidationService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use parley_api::config::AppConfig;
use parley_api::routes;
use parley_api::state::AppState;
use parley_api::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    let tracer_provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Parley API server");

    // Load conversation definitions for the default tenant.
    let definitions = Arc::new(InMemoryDefinitionRepository::new());
    if let Some(dir) = &config.definitions_dir {
        let count = definitions.load_dir(config.default_tenant, dir)?;
        tracing::info!(count, tenant = %config.default_tenant, "conversation definitions loaded");
    } else {
        tracing::warn!("DEFINITIONS_DIR not set; no conversations are defined");
    }

    // Outbound collaborators share one connection pool.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let app_state = AppState::new(
        definitions,
        Arc::new(HttpValidationService::new(
            http.clone(),
            &config.validation_service_url,
        )),
        Arc::new(HttpSagaProducer::new(
            http.clone(),
            &config.saga_orchestrator_url,
        )),
        Arc::new(HttpNpcMessenger::new(http, &config.npc_channel_url)),
        Arc::new(SystemClock),
        Box::new(SystemRng::new()),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/conversations", routes::conversations::router())
        .nest("/api/v1/characters", routes::characters::router())
        .nest("/api/v1/npcs", routes::npcs::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer_provider
        && let Err(e) = provider.shutdown()
    {
        tracing::warn!(error = %e, "failed to flush trace exporter");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
