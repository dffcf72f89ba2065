//! Tracing subscriber and optional OTLP span export.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

const SERVICE_NAME: &str = "parley-api";

/// Installs the global subscriber: JSON logs filtered by `RUST_LOG`
/// (default `info`), plus span export when `otlp_endpoint` is set.
///
/// The returned provider must be shut down on exit to flush spans.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if the exporter cannot be built or a
/// global subscriber is already installed.
pub fn init(otlp_endpoint: Option<&str>) -> Result<Option<SdkTracerProvider>, AppError> {
    let provider = otlp_endpoint.map(tracer_provider).transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    Ok(provider)
}

fn tracer_provider(endpoint: &str) -> Result<SdkTracerProvider, AppError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
