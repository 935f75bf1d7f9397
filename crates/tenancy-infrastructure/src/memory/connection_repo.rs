use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use tenancy_core::domain::ConnectionDescriptor;
use tenancy_core::error::DomainError;
use tenancy_core::repositories::ConnectionDescriptorRepository;

#[derive(Default)]
pub struct InMemoryConnectionDescriptorRepository {
    descriptors: RwLock<HashMap<Uuid, ConnectionDescriptor>>,
}

impl InMemoryConnectionDescriptorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionDescriptorRepository for InMemoryConnectionDescriptorRepository {
    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<ConnectionDescriptor>, DomainError> {
        Ok(self.descriptors.read().get(tenant_id).cloned())
    }

    async fn upsert(&self, tenant_id: &Uuid, descriptor: &ConnectionDescriptor) -> Result<(), DomainError> {
        let stored = ConnectionDescriptor { dedicated: true, ..descriptor.clone() };
        self.descriptors.write().insert(*tenant_id, stored);
        Ok(())
    }

    async fn remove(&self, tenant_id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.descriptors.write().remove(tenant_id).is_some())
    }
}
