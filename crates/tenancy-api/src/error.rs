//! HTTP mapping for request-path failures

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use tenancy_core::TenancyError;
use tenancy_shared::constants::RETRY_AFTER_SECS;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None)
            }
            ApiError::Tenancy(TenancyError::TenantUnresolved) => (
                StatusCode::FORBIDDEN,
                "TENANT_UNRESOLVED",
                "Tenant could not be determined for this request".to_string(),
                None,
            ),
            ApiError::Tenancy(TenancyError::CompanyUnresolved) => (
                StatusCode::FORBIDDEN,
                "COMPANY_UNRESOLVED",
                "Authenticated request carries no company".to_string(),
                None,
            ),
            ApiError::Tenancy(TenancyError::RoutingUnavailable(tenant_id)) => {
                tracing::error!(tenant_id = %tenant_id, "No connection target for tenant");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ROUTING_UNAVAILABLE",
                    "Tenant storage is not available".to_string(),
                    None,
                )
            }
            ApiError::Tenancy(TenancyError::Unavailable(msg)) => {
                tracing::error!("Registry unavailable: {}", msg);
                let body = ApiResponse::<()>::error(
                    "SERVICE_UNAVAILABLE",
                    "Tenant registry temporarily unavailable",
                );
                let mut response = (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
                return response;
            }
            ApiError::Tenancy(TenancyError::Denied(reason)) => (
                StatusCode::FORBIDDEN,
                reason.code(),
                reason.to_string(),
                serde_json::to_value(reason).ok(),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ApiResponse::<()>::error_with_details(code, &message, details);
        (status, Json(body)).into_response()
    }
}
