// ============================================================================
// Tenancy Core - Tenant Entity
// File: crates/tenancy-core/src/domain/tenant.rs
// Description: Customer organization with an isolated data scope
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use tenancy_shared::utils::normalize_key;

/// Tenant entity
///
/// `code` doubles as the subdomain label, so it follows DNS label rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: Uuid,

    #[validate(
        length(min = 2, max = 63, message = "Tenant code must be between 2 and 63 characters"),
        custom(function = "validate_tenant_code")
    )]
    pub code: String,

    #[validate(length(min = 3, max = 253, message = "Domain must be between 3 and 253 characters"))]
    pub domain: Option<String>,

    #[validate(length(min = 2, max = 200, message = "Display name must be between 2 and 200 characters"))]
    pub display_name: String,

    #[validate(email(message = "Contact email is invalid"))]
    pub contact_email: String,

    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(
        code: &str,
        domain: Option<&str>,
        display_name: &str,
        contact_email: &str,
    ) -> Result<Self, validator::ValidationErrors> {
        let tenant = Self {
            id: Uuid::new_v4(),
            code: normalize_key(code),
            domain: domain.map(normalize_key).filter(|d| !d.is_empty()),
            display_name: display_name.trim().to_string(),
            contact_email: contact_email.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
            modified_at: None,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    /// Lower-case code and domain in place. Stores compare them case-insensitively.
    pub fn normalize(&mut self) {
        self.code = normalize_key(&self.code);
        self.domain = self.domain.as_deref().map(normalize_key).filter(|d| !d.is_empty());
        self.display_name = self.display_name.trim().to_string();
        self.contact_email = self.contact_email.trim().to_string();
    }

    /// Soft delete; tenants are never removed while licenses or data reference them.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.modified_at = Some(Utc::now());
    }
}

fn validate_tenant_code(code: &str) -> Result<(), ValidationError> {
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !valid_chars || code.starts_with('-') || code.ends_with('-') {
        return Err(ValidationError::new("tenant_code_format"));
    }
    Ok(())
}
