use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use tenancy_core::domain::Tenant;
use tenancy_core::error::DomainError;
use tenancy_core::repositories::TenantRepository;

#[derive(Default)]
pub struct InMemoryTenantRepository {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(tenants: &HashMap<Uuid, Tenant>, tenant: &Tenant) -> Result<(), DomainError> {
        for other in tenants.values().filter(|t| t.id != tenant.id) {
            if other.code.eq_ignore_ascii_case(&tenant.code) {
                return Err(DomainError::TenantCodeAlreadyExists(tenant.code.clone()));
            }
            if let (Some(mine), Some(theirs)) = (&tenant.domain, &other.domain) {
                if mine.eq_ignore_ascii_case(theirs) {
                    return Err(DomainError::TenantDomainAlreadyExists(mine.clone()));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tenants.read().get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self
            .tenants
            .read()
            .values()
            .find(|t| t.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self
            .tenants
            .read()
            .values()
            .find(|t| t.domain.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(domain)))
            .cloned())
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write();
        if tenants.contains_key(&tenant.id) {
            return Err(DomainError::DatabaseError(format!("duplicate tenant id {}", tenant.id)));
        }
        Self::check_unique(&tenants, tenant)?;
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write();
        Self::check_unique(&tenants, tenant)?;
        let stored = tenants.get_mut(&tenant.id).ok_or(DomainError::TenantNotFound)?;
        // Code is fixed at creation
        *stored = Tenant { code: stored.code.clone(), ..tenant.clone() };
        Ok(stored.clone())
    }
}
