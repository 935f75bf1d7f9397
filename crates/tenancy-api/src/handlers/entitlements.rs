//! Entitlement checks for clients that gate UI ahead of the action

use axum::{extract::State, Json};

use tenancy_core::{Capability, Decision};

use crate::error::ApiError;
use crate::extractors::CurrentTenant;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/entitlements/check
///
/// Body: `{"capability": "use_reports"}` or
/// `{"capability": "add_employee", "current_count": 49}`. A denial is a 403 with
/// the denial code and details.
pub async fn check_entitlement(
    State(state): State<AppState>,
    CurrentTenant(ctx): CurrentTenant,
    Json(capability): Json<Capability>,
) -> Result<Json<ApiResponse<Decision>>, ApiError> {
    let decision = state.guard.authorize(&ctx, capability).await?;
    decision.into_result()?;
    Ok(Json(ApiResponse::success(decision)))
}
