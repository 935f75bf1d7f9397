// ============================================================================
// Tenancy API - Tenant Handlers
// File: crates/tenancy-api/src/handlers/tenant.rs
// ============================================================================
//! Read-only views of the resolved tenant

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use tenancy_core::{EntitlementSummary, ResolutionSource};

use crate::error::ApiError;
use crate::extractors::{CurrentConnection, CurrentTenant};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub tenant_id: Uuid,
    pub tenant_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub source: ResolutionSource,
    pub connection: ConnectionSummary,
}

/// DSNs stay server-side.
#[derive(Debug, Serialize)]
pub struct ConnectionSummary {
    pub dedicated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// GET /api/v1/tenant/context
pub async fn get_context(
    CurrentTenant(ctx): CurrentTenant,
    CurrentConnection(target): CurrentConnection,
) -> Json<ApiResponse<ContextResponse>> {
    Json(ApiResponse::success(ContextResponse {
        tenant_id: ctx.tenant_id(),
        tenant_code: ctx.tenant_code().to_string(),
        company_id: ctx.company_id().map(str::to_string),
        source: ctx.source(),
        connection: ConnectionSummary {
            dedicated: target.descriptor.dedicated,
            schema: target.descriptor.schema.clone(),
        },
    }))
}

/// GET /api/v1/tenant/entitlements
pub async fn get_entitlements(
    State(state): State<AppState>,
    CurrentTenant(ctx): CurrentTenant,
) -> Result<Json<ApiResponse<EntitlementSummary>>, ApiError> {
    let summary = state.guard.entitlements(&ctx).await?;
    Ok(Json(ApiResponse::success(summary)))
}
