// ============================================================================
// Tenancy Core - Provisioning Service
// File: crates/tenancy-core/src/services/provisioning.rs
// ============================================================================
//! Out-of-band tenant, license and descriptor writes.
//!
//! Every write that changes where a tenant's data lives invalidates the router
//! cache before returning.

use std::sync::Arc;
use uuid::Uuid;
use tracing::info;

use crate::domain::{ConnectionDescriptor, License, Tenant};
use crate::error::DomainError;
use crate::repositories::ConnectionDescriptorRepository;
use crate::services::{ConnectionRouter, LicenseRegistry, TenantRegistry};

pub struct ProvisioningService {
    tenants: Arc<TenantRegistry>,
    licenses: Arc<LicenseRegistry>,
    descriptors: Arc<dyn ConnectionDescriptorRepository>,
    router: Arc<ConnectionRouter>,
}

impl ProvisioningService {
    pub fn new(
        tenants: Arc<TenantRegistry>,
        licenses: Arc<LicenseRegistry>,
        descriptors: Arc<dyn ConnectionDescriptorRepository>,
        router: Arc<ConnectionRouter>,
    ) -> Self {
        Self { tenants, licenses, descriptors, router }
    }

    pub fn tenants(&self) -> &TenantRegistry {
        &self.tenants
    }

    pub fn licenses(&self) -> &LicenseRegistry {
        &self.licenses
    }

    pub async fn provision_tenant(&self, tenant: Tenant) -> Result<Tenant, DomainError> {
        self.tenants.upsert(tenant).await
    }

    /// The tenant's stored dedicated descriptor, bypassing the router cache.
    pub async fn dedicated_descriptor(&self, tenant_id: &Uuid) -> Result<Option<ConnectionDescriptor>, DomainError> {
        self.descriptors.find_by_tenant(tenant_id).await
    }

    /// Point a tenant at a dedicated storage target.
    pub async fn reprovision(
        &self,
        tenant_id: &Uuid,
        descriptor: ConnectionDescriptor,
    ) -> Result<(), DomainError> {
        if self.tenants.lookup_by_id(tenant_id).await?.is_none() {
            return Err(DomainError::TenantNotFound);
        }
        let descriptor = ConnectionDescriptor { dedicated: true, ..descriptor };
        self.descriptors.upsert(tenant_id, &descriptor).await?;
        self.router.invalidate(*tenant_id);
        info!("Tenant {} reprovisioned to {}", tenant_id, descriptor.redacted_dsn());
        Ok(())
    }

    /// Move a tenant back onto the shared default target.
    pub async fn release_dedicated(&self, tenant_id: &Uuid) -> Result<bool, DomainError> {
        let removed = self.descriptors.remove(tenant_id).await?;
        self.router.invalidate(*tenant_id);
        if removed {
            info!("Tenant {} moved to shared connection target", tenant_id);
        }
        Ok(removed)
    }

    pub async fn deactivate_tenant(&self, tenant_id: &Uuid) -> Result<Tenant, DomainError> {
        let tenant = self.tenants.deactivate(tenant_id).await?;
        self.router.invalidate(*tenant_id);
        Ok(tenant)
    }

    /// Replace the tenant's active license (upgrade, downgrade or renewal).
    ///
    /// A rejected replacement keeps the previous license in force.
    pub async fn replace_license(&self, license: License) -> Result<License, DomainError> {
        self.licenses.replace(license).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use chrono::{Duration as ChronoDuration, Utc};
    use crate::domain::LicenseType;
    use crate::repositories::{
        MockConnectionDescriptorRepository, MockLicenseRepository, MockTenantRepository,
    };

    fn acme() -> Tenant {
        Tenant::new("acme", None, "Acme Corp", "hr@acme.com").unwrap()
    }

    fn service(
        tenants: MockTenantRepository,
        licenses: MockLicenseRepository,
        descriptors: MockConnectionDescriptorRepository,
    ) -> (ProvisioningService, Arc<ConnectionRouter>) {
        let tenants: Arc<dyn crate::repositories::TenantRepository> = Arc::new(tenants);
        let descriptors: Arc<dyn ConnectionDescriptorRepository> = Arc::new(descriptors);
        let router = Arc::new(ConnectionRouter::new(
            Arc::clone(&descriptors),
            Some(ConnectionDescriptor::shared("postgres://shared/app", None)),
            Duration::from_secs(1),
        ));
        let service = ProvisioningService::new(
            Arc::new(TenantRegistry::new(Arc::clone(&tenants))),
            Arc::new(LicenseRegistry::new(Arc::new(licenses), tenants)),
            descriptors,
            Arc::clone(&router),
        );
        (service, router)
    }

    #[tokio::test]
    async fn test_reprovision_takes_effect_on_next_route() {
        let tenant = acme();
        let tenant_id = tenant.id;

        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(tenant.clone())));

        let mut descriptors = MockConnectionDescriptorRepository::new();
        let mut seq = mockall::Sequence::new();
        descriptors.expect_find_by_tenant()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        descriptors.expect_upsert()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, d| d.dedicated)
            .returning(|_, _| Ok(()));
        descriptors.expect_find_by_tenant()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(ConnectionDescriptor::dedicated("postgres://acme-db/app", None))));

        let (service, router) = service(tenants, MockLicenseRepository::new(), descriptors);

        let before = router.route_for(tenant_id).await.unwrap();
        assert!(!before.descriptor.dedicated);

        // Dedicated flag is forced even when the caller passes a shared descriptor
        service
            .reprovision(&tenant_id, ConnectionDescriptor::shared("postgres://acme-db/app", None))
            .await
            .unwrap();

        let after = router.route_for(tenant_id).await.unwrap();
        assert!(after.descriptor.dedicated);
        assert_eq!(after.descriptor.dsn, "postgres://acme-db/app");
    }

    #[tokio::test]
    async fn test_reprovision_unknown_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|_| Ok(None));
        let mut descriptors = MockConnectionDescriptorRepository::new();
        descriptors.expect_upsert().never();

        let (service, _) = service(tenants, MockLicenseRepository::new(), descriptors);
        let result = service
            .reprovision(&Uuid::new_v4(), ConnectionDescriptor::dedicated("postgres://x/y", None))
            .await;

        assert!(matches!(result, Err(DomainError::TenantNotFound)));
    }

    #[tokio::test]
    async fn test_release_dedicated_invalidates_cache() {
        let tenant_id = Uuid::new_v4();
        let mut descriptors = MockConnectionDescriptorRepository::new();
        descriptors.expect_find_by_tenant()
            .returning(|_| Ok(Some(ConnectionDescriptor::dedicated("postgres://acme-db/app", None))));
        descriptors.expect_remove().times(1).returning(|_| Ok(true));

        let (service, router) = service(MockTenantRepository::new(), MockLicenseRepository::new(), descriptors);
        router.route_for(tenant_id).await.unwrap();
        assert_eq!(router.cached_len(), 1);

        assert!(service.release_dedicated(&tenant_id).await.unwrap());
        assert_eq!(router.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_replace_license_swaps_in_one_write() {
        let tenant = acme();
        let tenant_id = tenant.id;
        let now = Utc::now();
        let new = License::for_type(tenant_id, LicenseType::Premium, now, now + ChronoDuration::days(365)).unwrap();
        let new_id = new.id;

        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(tenant.clone())));

        let mut licenses = MockLicenseRepository::new();
        licenses.expect_find_by_id().returning(|_| Ok(None));
        licenses.expect_update().never();
        licenses.expect_create().never();
        licenses.expect_replace_active()
            .times(1)
            .withf(move |l| l.id == new_id && l.is_active)
            .returning(|l| Ok(l.clone()));

        let (service, _) = service(tenants, licenses, MockConnectionDescriptorRepository::new());
        let current = service.replace_license(new).await.unwrap();

        assert_eq!(current.id, new_id);
        assert_eq!(current.license_type, LicenseType::Premium);
    }

    #[tokio::test]
    async fn test_rejected_replacement_leaves_current_license_alone() {
        let tenant = acme();
        let tenant_id = tenant.id;
        let now = Utc::now();
        let mut inverted = License::for_type(tenant_id, LicenseType::Premium, now, now + ChronoDuration::days(30)).unwrap();
        inverted.end_date = inverted.start_date - ChronoDuration::days(1);

        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(tenant.clone())));

        let mut licenses = MockLicenseRepository::new();
        licenses.expect_update().never();
        licenses.expect_create().never();
        licenses.expect_replace_active().never();

        let (service, _) = service(tenants, licenses, MockConnectionDescriptorRepository::new());
        let result = service.replace_license(inverted).await;

        assert!(matches!(result, Err(DomainError::InvalidLicenseWindow)));
    }
}
