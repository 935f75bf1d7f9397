// ============================================================================
// Tenancy Core - Tenant Registry
// File: crates/tenancy-core/src/services/tenant_registry.rs
// ============================================================================
//! Keyed tenant lookups and the write rules that keep codes and domains unique

use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use tracing::{info, warn};
use validator::Validate;

use tenancy_shared::utils::{mask_email, normalize_key};

use crate::domain::Tenant;
use crate::error::DomainError;
use crate::repositories::TenantRepository;

pub struct TenantRegistry {
    repo: Arc<dyn TenantRepository>,
}

impl TenantRegistry {
    pub fn new(repo: Arc<dyn TenantRepository>) -> Self {
        Self { repo }
    }

    pub async fn lookup_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        self.repo.find_by_id(id).await
    }

    pub async fn lookup_by_code(&self, code: &str) -> Result<Option<Tenant>, DomainError> {
        let code = normalize_key(code);
        if code.is_empty() {
            return Ok(None);
        }
        self.repo.find_by_code(&code).await
    }

    pub async fn lookup_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        let domain = normalize_key(domain);
        if domain.is_empty() {
            return Ok(None);
        }
        self.repo.find_by_domain(&domain).await
    }

    /// Create or update a tenant.
    ///
    /// The code of an existing tenant is immutable; code and domain must not collide
    /// with another tenant.
    pub async fn upsert(&self, mut tenant: Tenant) -> Result<Tenant, DomainError> {
        tenant.normalize();
        tenant.validate()?;

        let existing = self.repo.find_by_id(&tenant.id).await?;

        if let Some(current) = &existing {
            if current.code != tenant.code {
                warn!("Rejected code change for tenant {}: {} -> {}", tenant.id, current.code, tenant.code);
                return Err(DomainError::TenantCodeImmutable {
                    existing: current.code.clone(),
                    requested: tenant.code,
                });
            }
        }

        if let Some(other) = self.repo.find_by_code(&tenant.code).await? {
            if other.id != tenant.id {
                return Err(DomainError::TenantCodeAlreadyExists(tenant.code));
            }
        }

        if let Some(domain) = tenant.domain.as_deref() {
            if let Some(other) = self.repo.find_by_domain(domain).await? {
                if other.id != tenant.id {
                    return Err(DomainError::TenantDomainAlreadyExists(domain.to_string()));
                }
            }
        }

        match existing {
            Some(current) => {
                tenant.created_at = current.created_at;
                tenant.modified_at = Some(Utc::now());
                let updated = self.repo.update(&tenant).await?;
                info!("Tenant updated: {} ({})", updated.code, updated.id);
                Ok(updated)
            }
            None => {
                let created = self.repo.create(&tenant).await?;
                info!(
                    "Tenant created: {} ({}), contact {}",
                    created.code,
                    created.id,
                    mask_email(&created.contact_email)
                );
                Ok(created)
            }
        }
    }

    /// Soft-deactivate. Idempotent.
    pub async fn deactivate(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        let mut tenant = self.repo.find_by_id(id).await?
            .ok_or(DomainError::TenantNotFound)?;

        if !tenant.is_active {
            return Ok(tenant);
        }

        tenant.deactivate();
        let updated = self.repo.update(&tenant).await?;
        info!("Tenant deactivated: {} ({})", updated.code, updated.id);
        Ok(updated)
    }
}
