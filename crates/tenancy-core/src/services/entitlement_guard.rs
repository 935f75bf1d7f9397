// ============================================================================
// Tenancy Core - License Entitlement Guard
// File: crates/tenancy-core/src/services/entitlement_guard.rs
// ============================================================================
//! Per-request license authorization.
//!
//! The license is read fresh on every call; upgrades, downgrades and suspensions
//! apply to the very next request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{Capability, Decision, DenyReason, EntitlementSummary, License, TenantContext};
use crate::error::TenancyError;
use crate::services::{bounded_lookup, LicenseRegistry};

pub struct EntitlementGuard {
    licenses: Arc<LicenseRegistry>,
    lookup_timeout: Duration,
}

impl EntitlementGuard {
    pub fn new(licenses: Arc<LicenseRegistry>, lookup_timeout: Duration) -> Self {
        Self { licenses, lookup_timeout }
    }

    pub async fn authorize(&self, ctx: &TenantContext, capability: Capability) -> Result<Decision, TenancyError> {
        self.authorize_at(ctx, capability, Utc::now()).await
    }

    pub async fn authorize_at(
        &self,
        ctx: &TenantContext,
        capability: Capability,
        now: DateTime<Utc>,
    ) -> Result<Decision, TenancyError> {
        let license = self.current_license(ctx).await?;
        let decision = evaluate(license.as_ref(), capability, now);

        match decision {
            Decision::Allow => debug!(
                tenant_code = ctx.tenant_code(),
                capability = ?capability,
                "Entitlement granted"
            ),
            Decision::Deny(reason) => info!(
                tenant_code = ctx.tenant_code(),
                capability = ?capability,
                reason = reason.code(),
                "Entitlement denied"
            ),
        }

        Ok(decision)
    }

    pub async fn entitlements(&self, ctx: &TenantContext) -> Result<EntitlementSummary, TenancyError> {
        self.entitlements_at(ctx, Utc::now()).await
    }

    pub async fn entitlements_at(
        &self,
        ctx: &TenantContext,
        now: DateTime<Utc>,
    ) -> Result<EntitlementSummary, TenancyError> {
        let summary = match self.current_license(ctx).await? {
            Some(license) if license.is_valid_at(now) => EntitlementSummary::from_license(&license),
            _ => EntitlementSummary::none(),
        };
        Ok(summary)
    }

    async fn current_license(&self, ctx: &TenantContext) -> Result<Option<License>, TenancyError> {
        let tenant_id = ctx.tenant_id();
        bounded_lookup(
            self.lookup_timeout,
            "license",
            self.licenses.current_for_tenant(&tenant_id),
        )
        .await
    }
}

/// Pure license decision. A missing, inactive or out-of-window license denies everything.
pub fn evaluate(license: Option<&License>, capability: Capability, now: DateTime<Utc>) -> Decision {
    let license = match license {
        Some(l) if l.is_valid_at(now) => l,
        _ => return Decision::Deny(DenyReason::LicenseExpired),
    };

    match capability {
        Capability::AddEmployee { current_count } => {
            if current_count >= license.max_employees {
                Decision::Deny(DenyReason::EmployeeLimitReached {
                    limit: license.max_employees,
                    current: current_count,
                })
            } else {
                Decision::Allow
            }
        }
        feature_capability => match feature_capability.feature() {
            Some(feature) if feature.is_enabled_in(license) => Decision::Allow,
            Some(feature) => Decision::Deny(DenyReason::FeatureNotLicensed { feature }),
            None => Decision::Allow,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;
    use crate::domain::{FeatureFlags, Feature, LicenseType, ResolutionSource};
    use crate::error::DomainError;
    use crate::repositories::{MockLicenseRepository, MockTenantRepository};

    fn license(max_employees: u32, features: FeatureFlags, end_in_days: i64) -> License {
        let now = Utc::now();
        License::new(
            Uuid::new_v4(),
            LicenseType::Standard,
            max_employees,
            features,
            4_900,
            now - ChronoDuration::days(30),
            now + ChronoDuration::days(end_in_days),
        )
        .unwrap()
    }

    fn all_features() -> FeatureFlags {
        FeatureFlags { has_reports: true, has_api: true, has_mobile_app: true }
    }

    fn ctx() -> TenantContext {
        TenantContext::new(Uuid::new_v4(), "acme", Some("company-1".to_string()), ResolutionSource::Claim)
    }

    fn guard(licenses: MockLicenseRepository) -> EntitlementGuard {
        let registry = LicenseRegistry::new(Arc::new(licenses), Arc::new(MockTenantRepository::new()));
        EntitlementGuard::new(Arc::new(registry), std::time::Duration::from_secs(1))
    }

    #[test]
    fn test_expired_license_denies_even_enabled_feature() {
        let expired = license(50, all_features(), -1);

        assert_eq!(
            evaluate(Some(&expired), Capability::UseReports, Utc::now()),
            Decision::Deny(DenyReason::LicenseExpired)
        );
    }

    #[test]
    fn test_missing_license_has_no_entitlements() {
        assert_eq!(
            evaluate(None, Capability::AddEmployee { current_count: 0 }, Utc::now()),
            Decision::Deny(DenyReason::LicenseExpired)
        );
    }

    #[test]
    fn test_employee_limit() {
        let l = license(50, all_features(), 30);
        let now = Utc::now();

        assert_eq!(
            evaluate(Some(&l), Capability::AddEmployee { current_count: 50 }, now),
            Decision::Deny(DenyReason::EmployeeLimitReached { limit: 50, current: 50 })
        );
        assert_eq!(evaluate(Some(&l), Capability::AddEmployee { current_count: 49 }, now), Decision::Allow);
    }

    #[test]
    fn test_feature_not_licensed() {
        let l = license(50, FeatureFlags { has_reports: true, has_api: false, has_mobile_app: false }, 30);
        let now = Utc::now();

        assert_eq!(evaluate(Some(&l), Capability::UseReports, now), Decision::Allow);
        assert_eq!(
            evaluate(Some(&l), Capability::UseApi, now),
            Decision::Deny(DenyReason::FeatureNotLicensed { feature: Feature::Api })
        );
        assert_eq!(
            evaluate(Some(&l), Capability::UseMobileApp, now),
            Decision::Deny(DenyReason::FeatureNotLicensed { feature: Feature::MobileApp })
        );
    }

    #[test]
    fn test_license_not_yet_started() {
        let mut l = license(50, all_features(), 30);
        l.start_date = Utc::now() + ChronoDuration::days(1);

        assert_eq!(
            evaluate(Some(&l), Capability::UseApi, Utc::now()),
            Decision::Deny(DenyReason::LicenseExpired)
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(Decision::Allow.into_result(), Ok(()));
        assert_eq!(
            Decision::Deny(DenyReason::LicenseExpired).into_result(),
            Err(TenancyError::Denied(DenyReason::LicenseExpired))
        );
    }

    #[tokio::test]
    async fn test_license_change_applies_to_next_request() {
        let mut licenses = MockLicenseRepository::new();
        let mut seq = mockall::Sequence::new();
        let basic = license(50, FeatureFlags::default(), 30);
        let upgraded = license(50, all_features(), 30);
        licenses.expect_find_active_by_tenant()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(basic.clone())));
        licenses.expect_find_active_by_tenant()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(upgraded.clone())));

        let guard = guard(licenses);
        let ctx = ctx();

        assert!(!guard.authorize(&ctx, Capability::UseReports).await.unwrap().is_allowed());
        assert!(guard.authorize(&ctx, Capability::UseReports).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_registry_failure_is_unavailable_not_denial() {
        let mut licenses = MockLicenseRepository::new();
        licenses.expect_find_active_by_tenant()
            .returning(|_| Err(DomainError::DatabaseError("connection reset".to_string())));

        let result = guard(licenses).authorize(&ctx(), Capability::UseApi).await;

        assert!(matches!(result, Err(TenancyError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_entitlement_summary() {
        let mut licenses = MockLicenseRepository::new();
        let current = license(120, FeatureFlags { has_reports: true, has_api: false, has_mobile_app: true }, 30);
        licenses.expect_find_active_by_tenant().returning(move |_| Ok(Some(current.clone())));

        let summary = guard(licenses).entitlements(&ctx()).await.unwrap();

        assert_eq!(summary.license_type, Some(LicenseType::Standard));
        assert_eq!(summary.features, vec![Feature::Reports, Feature::MobileApp]);
        assert_eq!(summary.max_employees, 120);
    }

    #[tokio::test]
    async fn test_expired_summary_is_empty() {
        let mut licenses = MockLicenseRepository::new();
        let expired = license(120, all_features(), -1);
        licenses.expect_find_active_by_tenant().returning(move |_| Ok(Some(expired.clone())));

        let summary = guard(licenses).entitlements(&ctx()).await.unwrap();

        assert_eq!(summary, EntitlementSummary::none());
    }
}
