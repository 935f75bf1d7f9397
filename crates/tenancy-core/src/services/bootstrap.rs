// ============================================================================
// Tenancy Core - Seed Bootstrap
// File: crates/tenancy-core/src/services/bootstrap.rs
// ============================================================================
//! Declarative tenant/license/descriptor seeding.
//!
//! The seed fills in missing state and never overrides operator changes:
//! tenants are matched by code, a soft-deactivated tenant is left alone, and a
//! license or dedicated descriptor is only written when the tenant has none.
//! Applying the same seed twice leaves the registries unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{ConnectionDescriptor, FeatureFlags, License, LicenseType, Tenant};
use crate::error::DomainError;
use crate::services::ProvisioningService;

#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub tenants: Vec<SeedTenant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTenant {
    pub code: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub display_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub license: Option<SeedLicense>,
    #[serde(default)]
    pub descriptor: Option<ConnectionDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedLicense {
    pub license_type: LicenseType,
    /// Falls back to the catalogue default for the type.
    #[serde(default)]
    pub max_employees: Option<u32>,
    #[serde(default)]
    pub features: Option<FeatureFlags>,
    #[serde(default)]
    pub monthly_price_cents: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl SeedLicense {
    fn max_employees(&self) -> u32 {
        self.max_employees.unwrap_or_else(|| self.license_type.default_max_employees())
    }

    fn features(&self) -> FeatureFlags {
        self.features.unwrap_or_else(|| self.license_type.default_features())
    }

    fn issue(&self, tenant: &Tenant) -> Result<License, DomainError> {
        License::new(
            tenant.id,
            self.license_type,
            self.max_employees(),
            self.features(),
            self.monthly_price_cents,
            self.start_date,
            self.end_date,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub tenants_created: usize,
    pub tenants_updated: usize,
    pub tenants_skipped: usize,
    pub licenses_issued: usize,
    pub descriptors_applied: usize,
}

impl SeedFile {
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::ValidationError(format!("Invalid seed file: {}", e)))
    }

    pub async fn apply(&self, provisioning: &ProvisioningService) -> Result<SeedReport, DomainError> {
        let mut report = SeedReport::default();

        for seed in &self.tenants {
            let Some(tenant) = self.apply_tenant(seed, provisioning, &mut report).await? else {
                continue;
            };

            if let Some(terms) = &seed.license {
                if provisioning.licenses().current_for_tenant(&tenant.id).await?.is_none() {
                    provisioning.replace_license(terms.issue(&tenant)?).await?;
                    report.licenses_issued += 1;
                }
            }

            if let Some(descriptor) = &seed.descriptor {
                if provisioning.dedicated_descriptor(&tenant.id).await?.is_none() {
                    provisioning.reprovision(&tenant.id, descriptor.clone()).await?;
                    report.descriptors_applied += 1;
                }
            }
        }

        info!(
            created = report.tenants_created,
            updated = report.tenants_updated,
            skipped = report.tenants_skipped,
            licenses = report.licenses_issued,
            descriptors = report.descriptors_applied,
            "Seed applied"
        );
        Ok(report)
    }

    /// `None` when the tenant exists but was deactivated out of band.
    async fn apply_tenant(
        &self,
        seed: &SeedTenant,
        provisioning: &ProvisioningService,
        report: &mut SeedReport,
    ) -> Result<Option<Tenant>, DomainError> {
        let desired = Tenant::new(
            &seed.code,
            seed.domain.as_deref(),
            &seed.display_name,
            &seed.contact_email,
        )?;

        match provisioning.tenants().lookup_by_code(&desired.code).await? {
            Some(existing) if !existing.is_active => {
                warn!(tenant_code = %existing.code, "Seed skips deactivated tenant");
                report.tenants_skipped += 1;
                Ok(None)
            }
            Some(existing) => {
                let unchanged = existing.domain == desired.domain
                    && existing.display_name == desired.display_name
                    && existing.contact_email == desired.contact_email;
                if unchanged {
                    return Ok(Some(existing));
                }
                let tenant = Tenant {
                    domain: desired.domain,
                    display_name: desired.display_name,
                    contact_email: desired.contact_email,
                    ..existing
                };
                report.tenants_updated += 1;
                provisioning.provision_tenant(tenant).await.map(Some)
            }
            None => {
                report.tenants_created += 1;
                provisioning.provision_tenant(desired).await.map(Some)
            }
        }
    }
}
