//! PostgreSQL repository implementations

pub mod tenant_repo_impl;
pub mod license_repo_impl;
pub mod connection_repo_impl;

pub use tenant_repo_impl::PgTenantRepository;
pub use license_repo_impl::PgLicenseRepository;
pub use connection_repo_impl::PgConnectionDescriptorRepository;

use tenancy_core::error::DomainError;
use tracing::error;

/// Map a write error, surfacing unique-index violations as `conflict`.
pub(crate) fn write_error(action: &str, e: sqlx::Error, conflict: impl FnOnce(&str) -> Option<DomainError>) -> DomainError {
    error!("Database error {}: {}", action, e);
    let msg = e.to_string();
    if msg.contains("unique") || msg.contains("duplicate") {
        if let Some(mapped) = conflict(&msg) {
            return mapped;
        }
    }
    DomainError::DatabaseError(msg)
}

pub(crate) fn read_error(action: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", action, e);
    DomainError::DatabaseError(e.to_string())
}
