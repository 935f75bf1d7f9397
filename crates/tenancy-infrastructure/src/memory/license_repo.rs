use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use tenancy_core::domain::License;
use tenancy_core::error::DomainError;
use tenancy_core::repositories::LicenseRepository;

#[derive(Default)]
pub struct InMemoryLicenseRepository {
    licenses: RwLock<HashMap<Uuid, License>>,
}

impl InMemoryLicenseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors the table constraints: valid window, one active license per tenant.
    fn check_constraints(licenses: &HashMap<Uuid, License>, license: &License) -> Result<(), DomainError> {
        license.validate_window()?;
        if license.is_active {
            let clash = licenses
                .values()
                .any(|l| l.id != license.id && l.tenant_id == license.tenant_id && l.is_active);
            if clash {
                return Err(DomainError::ActiveLicenseExists(license.tenant_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LicenseRepository for InMemoryLicenseRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<License>, DomainError> {
        Ok(self.licenses.read().get(id).cloned())
    }

    async fn find_active_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<License>, DomainError> {
        Ok(self
            .licenses
            .read()
            .values()
            .find(|l| l.tenant_id == *tenant_id && l.is_active)
            .cloned())
    }

    async fn create(&self, license: &License) -> Result<License, DomainError> {
        let mut licenses = self.licenses.write();
        if licenses.contains_key(&license.id) {
            return Err(DomainError::DatabaseError(format!("duplicate license id {}", license.id)));
        }
        Self::check_constraints(&licenses, license)?;
        licenses.insert(license.id, license.clone());
        Ok(license.clone())
    }

    async fn update(&self, license: &License) -> Result<License, DomainError> {
        let mut licenses = self.licenses.write();
        if !licenses.contains_key(&license.id) {
            return Err(DomainError::LicenseNotFound);
        }
        Self::check_constraints(&licenses, license)?;
        licenses.insert(license.id, license.clone());
        Ok(license.clone())
    }

    async fn replace_active(&self, license: &License) -> Result<License, DomainError> {
        license.validate_window()?;
        let mut licenses = self.licenses.write();
        for other in licenses.values_mut() {
            if other.tenant_id == license.tenant_id && other.id != license.id && other.is_active {
                other.deactivate();
            }
        }
        licenses.insert(license.id, license.clone());
        Ok(license.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tenancy_core::domain::LicenseType;

    fn license(tenant_id: Uuid) -> License {
        let now = Utc::now();
        License::for_type(tenant_id, LicenseType::Basic, now, now + Duration::days(30)).unwrap()
    }

    #[tokio::test]
    async fn test_one_active_license_per_tenant() {
        let repo = InMemoryLicenseRepository::new();
        let tenant_id = Uuid::new_v4();
        repo.create(&license(tenant_id)).await.unwrap();

        assert!(matches!(
            repo.create(&license(tenant_id)).await,
            Err(DomainError::ActiveLicenseExists(id)) if id == tenant_id
        ));

        let mut inactive = license(tenant_id);
        inactive.is_active = false;
        assert!(repo.create(&inactive).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_active_skips_inactive() {
        let repo = InMemoryLicenseRepository::new();
        let tenant_id = Uuid::new_v4();
        let mut old = license(tenant_id);
        old.is_active = false;
        repo.create(&old).await.unwrap();
        let current = repo.create(&license(tenant_id)).await.unwrap();

        let found = repo.find_active_by_tenant(&tenant_id).await.unwrap();

        assert_eq!(found.map(|l| l.id), Some(current.id));
    }

    #[tokio::test]
    async fn test_replace_active_swaps_current_license() {
        let repo = InMemoryLicenseRepository::new();
        let tenant_id = Uuid::new_v4();
        let old = repo.create(&license(tenant_id)).await.unwrap();

        let new = repo.replace_active(&license(tenant_id)).await.unwrap();

        let current = repo.find_active_by_tenant(&tenant_id).await.unwrap();
        assert_eq!(current.map(|l| l.id), Some(new.id));
        assert!(!repo.find_by_id(&old.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_current_license() {
        let repo = InMemoryLicenseRepository::new();
        let tenant_id = Uuid::new_v4();
        let old = repo.create(&license(tenant_id)).await.unwrap();
        let mut bad = license(tenant_id);
        bad.end_date = bad.start_date - Duration::seconds(1);

        assert!(matches!(repo.replace_active(&bad).await, Err(DomainError::InvalidLicenseWindow)));

        let current = repo.find_active_by_tenant(&tenant_id).await.unwrap();
        assert_eq!(current.map(|l| l.id), Some(old.id));
        assert!(repo.find_by_id(&bad.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_inverted_window() {
        let repo = InMemoryLicenseRepository::new();
        let mut bad = license(Uuid::new_v4());
        bad.end_date = bad.start_date - Duration::seconds(1);

        assert!(matches!(repo.create(&bad).await, Err(DomainError::InvalidLicenseWindow)));
    }
}
