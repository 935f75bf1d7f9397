//! Connection descriptor repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::ConnectionDescriptor;
use crate::error::DomainError;

/// Tenant-specific storage descriptors. Tenants without one use the shared default.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionDescriptorRepository: Send + Sync {
    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<ConnectionDescriptor>, DomainError>;
    async fn upsert(&self, tenant_id: &Uuid, descriptor: &ConnectionDescriptor) -> Result<(), DomainError>;
    async fn remove(&self, tenant_id: &Uuid) -> Result<bool, DomainError>;
}
