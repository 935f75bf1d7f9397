//! Registries and request-path services

pub mod tenant_registry;
pub mod license_registry;
pub mod tenant_resolver;
pub mod connection_router;
pub mod entitlement_guard;
pub mod provisioning;
pub mod bootstrap;

pub use tenant_registry::TenantRegistry;
pub use license_registry::LicenseRegistry;
pub use tenant_resolver::{ResolverOptions, TenantResolver};
pub use connection_router::ConnectionRouter;
pub use entitlement_guard::EntitlementGuard;
pub use provisioning::ProvisioningService;
pub use bootstrap::{SeedFile, SeedReport};

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{DomainError, TenancyError};

/// Run one registry lookup under the request's time budget.
///
/// Store failures and timeouts both become `Unavailable`; nothing is retried here.
pub(crate) async fn bounded_lookup<T, F>(
    budget: Duration,
    what: &'static str,
    lookup: F,
) -> Result<T, TenancyError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(budget, lookup).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(registry = what, error = %e, "Registry lookup failed");
            Err(TenancyError::Unavailable(format!("{} lookup failed: {}", what, e)))
        }
        Err(_) => {
            warn!(registry = what, timeout_ms = budget.as_millis() as u64, "Registry lookup timed out");
            Err(TenancyError::Unavailable(format!(
                "{} lookup timed out after {}ms",
                what,
                budget.as_millis()
            )))
        }
    }
}
