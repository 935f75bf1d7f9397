//! License repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::License;
use crate::error::DomainError;

/// Durable license store. At most one active license per tenant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<License>, DomainError>;
    async fn find_active_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<License>, DomainError>;
    async fn create(&self, license: &License) -> Result<License, DomainError>;
    async fn update(&self, license: &License) -> Result<License, DomainError>;
    /// Deactivate every other active license of `license.tenant_id` and store
    /// `license` (insert or update by id) as one atomic write. On error nothing changes.
    async fn replace_active(&self, license: &License) -> Result<License, DomainError>;
}
