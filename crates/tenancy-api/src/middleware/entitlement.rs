//! License gate for feature-bound routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use tenancy_core::{Capability, Feature};

use crate::error::ApiError;
use crate::extractors::CurrentTenant;
use crate::state::AppState;

/// Reject the request unless the tenant's license grants `feature`.
///
/// Mount inside `tenant_scope` or `trusted_tenant_scope` with
/// `from_fn_with_state((state, Feature::Reports), require_feature)`.
pub async fn require_feature(
    State((state, feature)): State<(AppState, Feature)>,
    CurrentTenant(ctx): CurrentTenant,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state
        .guard
        .authorize(&ctx, Capability::from(feature))
        .await?
        .into_result()?;

    Ok(next.run(request).await)
}
