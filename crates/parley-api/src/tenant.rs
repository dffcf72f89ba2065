//! Tenant extraction from request headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parley_core::tenant::TenantId;

use crate::error::ApiError;

/// Header carrying the caller's tenant UUID.
pub const TENANT_HEADER: &str = "tenant_id";

/// The tenant a request acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant(pub TenantId);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or(ApiError::MissingTenant)?;
        let raw = value
            .to_str()
            .map_err(|e| ApiError::InvalidTenant(e.to_string()))?;
        raw.trim()
            .parse::<TenantId>()
            .map(Self)
            .map_err(|e| ApiError::InvalidTenant(e.to_string()))
    }
}
