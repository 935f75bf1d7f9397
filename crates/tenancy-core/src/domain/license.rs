// ============================================================================
// Tenancy Core - License Entity
// File: crates/tenancy-core/src/domain/license.rs
// Description: Commercial entitlement record bounding a tenant's features and quotas
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// License type enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    #[default]
    Trial,
    Basic,
    Standard,
    Premium,
    Enterprise,
}

impl LicenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::Trial => "trial",
            LicenseType::Basic => "basic",
            LicenseType::Standard => "standard",
            LicenseType::Premium => "premium",
            LicenseType::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(LicenseType::Trial),
            "basic" => Some(LicenseType::Basic),
            "standard" => Some(LicenseType::Standard),
            "premium" => Some(LicenseType::Premium),
            "enterprise" => Some(LicenseType::Enterprise),
            _ => None,
        }
    }

    /// Catalogue defaults used when a license is issued without explicit flags.
    pub fn default_features(&self) -> FeatureFlags {
        match self {
            LicenseType::Trial => FeatureFlags { has_reports: true, has_api: false, has_mobile_app: true },
            LicenseType::Basic => FeatureFlags { has_reports: false, has_api: false, has_mobile_app: false },
            LicenseType::Standard => FeatureFlags { has_reports: true, has_api: false, has_mobile_app: true },
            LicenseType::Premium | LicenseType::Enterprise => {
                FeatureFlags { has_reports: true, has_api: true, has_mobile_app: true }
            }
        }
    }

    pub fn default_max_employees(&self) -> u32 {
        match self {
            LicenseType::Trial => 10,
            LicenseType::Basic => 25,
            LicenseType::Standard => 100,
            LicenseType::Premium => 500,
            LicenseType::Enterprise => 10_000,
        }
    }
}

/// Feature switches carried by a license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub has_reports: bool,
    pub has_api: bool,
    pub has_mobile_app: bool,
}

/// License entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub license_type: LicenseType,
    pub max_employees: u32,
    pub features: FeatureFlags,
    /// Minor currency units.
    pub monthly_price_cents: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl License {
    pub fn new(
        tenant_id: Uuid,
        license_type: LicenseType,
        max_employees: u32,
        features: FeatureFlags,
        monthly_price_cents: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let license = Self {
            id: Uuid::new_v4(),
            tenant_id,
            license_type,
            max_employees,
            features,
            monthly_price_cents,
            start_date,
            end_date,
            is_active: true,
            created_at: Utc::now(),
            modified_at: None,
        };

        license.validate_window()?;
        Ok(license)
    }

    /// License with the catalogue defaults for its type.
    pub fn for_type(
        tenant_id: Uuid,
        license_type: LicenseType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::new(
            tenant_id,
            license_type,
            license_type.default_max_employees(),
            license_type.default_features(),
            0,
            start_date,
            end_date,
        )
    }

    pub fn validate_window(&self) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::InvalidLicenseWindow);
        }
        if self.monthly_price_cents < 0 {
            return Err(DomainError::ValidationError("Monthly price cannot be negative".to_string()));
        }
        Ok(())
    }

    /// Active and `now` inside the inclusive [start, end] window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.modified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_must_not_be_inverted() {
        let now = Utc::now();
        let result = License::for_type(Uuid::new_v4(), LicenseType::Basic, now, now - Duration::days(1));
        assert!(matches!(result, Err(DomainError::InvalidLicenseWindow)));
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let start = Utc::now();
        let end = start + Duration::days(30);
        let license = License::for_type(Uuid::new_v4(), LicenseType::Standard, start, end).unwrap();

        assert!(license.is_valid_at(start));
        assert!(license.is_valid_at(end));
        assert!(!license.is_valid_at(start - Duration::seconds(1)));
        assert!(!license.is_valid_at(end + Duration::seconds(1)));
    }

    #[test]
    fn test_default_type_is_trial() {
        assert_eq!(LicenseType::default(), LicenseType::Trial);
    }

    #[test]
    fn test_inactive_license_is_never_valid() {
        let start = Utc::now() - Duration::days(1);
        let mut license = License::for_type(Uuid::new_v4(), LicenseType::Premium, start, start + Duration::days(365)).unwrap();
        license.deactivate();

        assert!(!license.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_basic_license_has_no_features() {
        let now = Utc::now();
        let license = License::for_type(Uuid::new_v4(), LicenseType::Basic, now, now + Duration::days(30)).unwrap();

        assert_eq!(license.features, FeatureFlags::default());
        assert_eq!(license.max_employees, 25);
        assert_eq!(LicenseType::from_str("gold"), None);
    }
}
