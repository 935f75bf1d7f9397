//! Domain and request-path errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::DenyReason;

/// Errors raised by registries and repositories.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found")]
    TenantNotFound,

    #[error("License not found")]
    LicenseNotFound,

    #[error("Tenant code already exists: {0}")]
    TenantCodeAlreadyExists(String),

    #[error("Tenant domain already exists: {0}")]
    TenantDomainAlreadyExists(String),

    #[error("Tenant code cannot be changed: {existing} -> {requested}")]
    TenantCodeImmutable { existing: String, requested: String },

    #[error("Tenant {0} already has an active license")]
    ActiveLicenseExists(Uuid),

    #[error("License end date precedes start date")]
    InvalidLicenseWindow,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(e: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(e.to_string())
    }
}

/// Terminal per-request outcomes of tenant resolution, routing and authorization.
///
/// Only `Unavailable` is transient; callers may retry it with backoff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenancyError {
    #[error("Tenant could not be resolved")]
    TenantUnresolved,

    #[error("Company could not be resolved")]
    CompanyUnresolved,

    #[error("No connection target for tenant {0}")]
    RoutingUnavailable(Uuid),

    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Entitlement denied: {0}")]
    Denied(DenyReason),
}
