//! Service configuration read from the environment.

use std::path::PathBuf;

use parley_core::tenant::TenantId;
use uuid::Uuid;

use crate::error::AppError;

/// Settings parsed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory of conversation documents loaded for `default_tenant`.
    pub definitions_dir: Option<PathBuf>,
    pub default_tenant: TenantId,
    pub validation_service_url: String,
    pub saga_orchestrator_url: String,
    pub npc_channel_url: String,
    /// OTLP/gRPC collector; spans are only exported when set.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let default_tenant = match lookup("DEFAULT_TENANT_ID") {
            Some(raw) => raw.parse::<TenantId>().map_err(|e| {
                AppError::Config(format!("DEFAULT_TENANT_ID must be a UUID: {e}"))
            })?,
            None => TenantId::new(Uuid::nil()),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            definitions_dir: lookup("DEFINITIONS_DIR").map(PathBuf::from),
            default_tenant,
            validation_service_url: required("VALIDATION_SERVICE_URL")?,
            saga_orchestrator_url: required("SAGA_ORCHESTRATOR_URL")?,
            npc_channel_url: required("NPC_CHANNEL_URL")?,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|value| !value.is_empty()),
        })
    }
}
