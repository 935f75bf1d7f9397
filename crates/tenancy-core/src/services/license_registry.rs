// ============================================================================
// Tenancy Core - License Registry
// File: crates/tenancy-core/src/services/license_registry.rs
// ============================================================================
//! License lookups and the one-active-license-per-tenant rule

use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use tracing::{info, warn};

use crate::domain::License;
use crate::error::DomainError;
use crate::repositories::{LicenseRepository, TenantRepository};

pub struct LicenseRegistry {
    licenses: Arc<dyn LicenseRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl LicenseRegistry {
    pub fn new(licenses: Arc<dyn LicenseRepository>, tenants: Arc<dyn TenantRepository>) -> Self {
        Self { licenses, tenants }
    }

    pub async fn lookup_by_id(&self, id: &Uuid) -> Result<Option<License>, DomainError> {
        self.licenses.find_by_id(id).await
    }

    /// The tenant's active license, if any. Validity dates are checked by the guard.
    pub async fn current_for_tenant(&self, tenant_id: &Uuid) -> Result<Option<License>, DomainError> {
        self.licenses.find_active_by_tenant(tenant_id).await
    }

    pub async fn upsert(&self, mut license: License) -> Result<License, DomainError> {
        license.validate_window()?;

        if self.tenants.find_by_id(&license.tenant_id).await?.is_none() {
            return Err(DomainError::TenantNotFound);
        }

        if license.is_active {
            if let Some(active) = self.licenses.find_active_by_tenant(&license.tenant_id).await? {
                if active.id != license.id {
                    warn!(
                        "Rejected second active license for tenant {} (active: {})",
                        license.tenant_id, active.id
                    );
                    return Err(DomainError::ActiveLicenseExists(license.tenant_id));
                }
            }
        }

        match self.licenses.find_by_id(&license.id).await? {
            Some(current) => {
                license.created_at = current.created_at;
                license.modified_at = Some(Utc::now());
                let updated = self.licenses.update(&license).await?;
                info!(
                    "License updated: {} for tenant {} ({}, max {} employees)",
                    updated.id, updated.tenant_id, updated.license_type.as_str(), updated.max_employees
                );
                Ok(updated)
            }
            None => {
                let created = self.licenses.create(&license).await?;
                info!(
                    "License created: {} for tenant {} ({}, max {} employees)",
                    created.id, created.tenant_id, created.license_type.as_str(), created.max_employees
                );
                Ok(created)
            }
        }
    }

    /// Make `license` the tenant's only active license.
    ///
    /// All checks run before the store is touched, and the swap itself is a single
    /// store write, so a rejected replacement leaves the previous license active.
    pub async fn replace(&self, mut license: License) -> Result<License, DomainError> {
        license.validate_window()?;

        if self.tenants.find_by_id(&license.tenant_id).await?.is_none() {
            return Err(DomainError::TenantNotFound);
        }

        license.is_active = true;
        if let Some(existing) = self.licenses.find_by_id(&license.id).await? {
            license.created_at = existing.created_at;
            license.modified_at = Some(Utc::now());
        }

        let current = self.licenses.replace_active(&license).await?;
        info!(
            "License replaced: {} now active for tenant {} ({}, max {} employees)",
            current.id, current.tenant_id, current.license_type.as_str(), current.max_employees
        );
        Ok(current)
    }

    /// Soft-deactivate. Idempotent.
    pub async fn deactivate(&self, id: &Uuid) -> Result<License, DomainError> {
        let mut license = self.licenses.find_by_id(id).await?
            .ok_or(DomainError::LicenseNotFound)?;

        if !license.is_active {
            return Ok(license);
        }

        license.deactivate();
        let updated = self.licenses.update(&license).await?;
        info!("License deactivated: {} for tenant {}", updated.id, updated.tenant_id);
        Ok(updated)
    }
}
