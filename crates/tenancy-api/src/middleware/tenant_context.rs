//! Tenant context middleware
//!
//! Runs once per request: bearer token to claims, claims plus `Host` (plus
//! `X-Tenant-Id` on trusted routes) to a `TenantContext`, then the tenant to a
//! connection target. Both are inserted as request extensions for the handlers.
//!
//! The tenant header is a machine-to-machine signal. Public routes never read it,
//! so an anonymous browser caller cannot pick a tenant.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use tenancy_core::AuthenticatedClaims;
use tenancy_shared::constants::TENANT_HEADER;

use crate::error::ApiError;
use crate::state::AppState;

/// Public routes: tenant from token claim or host only.
pub async fn tenant_context_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    scope_request(&state, request, next, false).await
}

/// Internal service-to-service routes: the tenant header is honoured as well.
pub async fn trusted_tenant_context_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    scope_request(&state, request, next, true).await
}

async fn scope_request(
    state: &AppState,
    mut request: Request,
    next: Next,
    trusted: bool,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(state, request.headers())?;
    let tenant_header = header_str(request.headers(), TENANT_HEADER);
    if !trusted && tenant_header.is_some() {
        debug!("Ignoring {} on public route", TENANT_HEADER);
    }
    let tenant_header = tenant_header.filter(|_| trusted);
    let host = header_str(request.headers(), header::HOST.as_str())
        .or_else(|| request.uri().host());

    let ctx = state.resolver.resolve(tenant_header, claims.as_ref(), host).await?;
    let target = state.router.route_for(ctx.tenant_id()).await?;

    debug!(
        tenant_code = ctx.tenant_code(),
        source = ctx.source().as_str(),
        dedicated = target.descriptor.dedicated,
        "Request scoped to tenant"
    );

    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(target);

    Ok(next.run(request).await)
}

/// `None` for anonymous requests; an unusable token is rejected rather than ignored.
fn bearer_claims(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthenticatedClaims>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Malformed Authorization header".to_string()))?;

    let claims = state
        .jwt
        .validate_token(token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    Ok(Some(claims.to_authenticated_claims()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
