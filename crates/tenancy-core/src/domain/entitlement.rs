//! Capabilities, authorization decisions and entitlement summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::license::{License, LicenseType};
use crate::error::TenancyError;

/// Licensable product features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Reports,
    Api,
    MobileApp,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Reports => "reports",
            Feature::Api => "api",
            Feature::MobileApp => "mobile_app",
        }
    }

    pub fn is_enabled_in(&self, license: &License) -> bool {
        match self {
            Feature::Reports => license.features.has_reports,
            Feature::Api => license.features.has_api,
            Feature::MobileApp => license.features.has_mobile_app,
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a request wants to do that the license may or may not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum Capability {
    UseReports,
    UseApi,
    UseMobileApp,
    /// `current_count` is the tenant's employee headcount before the addition.
    AddEmployee { current_count: u32 },
}

impl Capability {
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Capability::UseReports => Some(Feature::Reports),
            Capability::UseApi => Some(Feature::Api),
            Capability::UseMobileApp => Some(Feature::MobileApp),
            Capability::AddEmployee { .. } => None,
        }
    }
}

impl From<Feature> for Capability {
    fn from(feature: Feature) -> Self {
        match feature {
            Feature::Reports => Capability::UseReports,
            Feature::Api => Capability::UseApi,
            Feature::MobileApp => Capability::UseMobileApp,
        }
    }
}

/// Structured business denial, surfaced to callers for an upgrade path
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    #[error("no active license covers the current date")]
    LicenseExpired,

    #[error("feature {feature} is not licensed")]
    FeatureNotLicensed { feature: Feature },

    #[error("employee limit reached ({current}/{limit})")]
    EmployeeLimitReached { limit: u32, current: u32 },
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::LicenseExpired => "LICENSE_EXPIRED",
            DenyReason::FeatureNotLicensed { .. } => "FEATURE_NOT_LICENSED",
            DenyReason::EmployeeLimitReached { .. } => "EMPLOYEE_LIMIT_REACHED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), TenancyError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(TenancyError::Denied(reason)),
        }
    }
}

/// What a tenant's current license grants, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementSummary {
    pub license_type: Option<LicenseType>,
    pub features: Vec<Feature>,
    pub max_employees: u32,
    pub valid_until: Option<DateTime<Utc>>,
}

impl EntitlementSummary {
    /// A tenant without a valid license has zero entitlements.
    pub fn none() -> Self {
        Self {
            license_type: None,
            features: Vec::new(),
            max_employees: 0,
            valid_until: None,
        }
    }

    pub fn from_license(license: &License) -> Self {
        let features = [Feature::Reports, Feature::Api, Feature::MobileApp]
            .into_iter()
            .filter(|f| f.is_enabled_in(license))
            .collect();

        Self {
            license_type: Some(license.license_type),
            features,
            max_employees: license.max_employees,
            valid_until: Some(license.end_date),
        }
    }
}
