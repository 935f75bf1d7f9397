//! Typed access to what the tenant-context middleware resolved

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use tenancy_core::{ConnectionTarget, TenantContext};

use crate::error::ApiError;

/// Resolved tenant context for the current request.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantContext);

/// Connection target chosen for the current request's tenant.
#[derive(Debug, Clone)]
pub struct CurrentConnection(pub Arc<ConnectionTarget>);

// Missing extensions mean a route was mounted outside a tenant scope.
impl<S: Send + Sync> FromRequestParts<S> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| ApiError::InternalError("Tenant context middleware not applied".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentConnection {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ConnectionTarget>>()
            .cloned()
            .map(CurrentConnection)
            .ok_or_else(|| ApiError::InternalError("Tenant context middleware not applied".to_string()))
    }
}
