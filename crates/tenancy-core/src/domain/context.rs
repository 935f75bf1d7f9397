//! Per-request tenant context

use serde::Serialize;
use uuid::Uuid;

use crate::error::TenancyError;

/// Which candidate signal produced the resolved tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Header,
    Claim,
    Subdomain,
    /// Whole host matched a tenant's custom domain.
    Domain,
    Default,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Header => "header",
            ResolutionSource::Claim => "claim",
            ResolutionSource::Subdomain => "subdomain",
            ResolutionSource::Domain => "domain",
            ResolutionSource::Default => "default",
        }
    }
}

/// Resolved identity scoping every data access made on behalf of one request.
///
/// Built once per request and never cached; fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    tenant_id: Uuid,
    tenant_code: String,
    company_id: Option<String>,
    source: ResolutionSource,
}

impl TenantContext {
    pub fn new(
        tenant_id: Uuid,
        tenant_code: impl Into<String>,
        company_id: Option<String>,
        source: ResolutionSource,
    ) -> Self {
        Self {
            tenant_id,
            tenant_code: tenant_code.into(),
            company_id,
            source,
        }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn tenant_code(&self) -> &str {
        &self.tenant_code
    }

    /// `None` only for unauthenticated (machine-to-machine) requests.
    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    /// Company scope for writes. Never defaulted.
    pub fn require_company(&self) -> Result<&str, TenancyError> {
        self.company_id.as_deref().ok_or(TenancyError::CompanyUnresolved)
    }
}
