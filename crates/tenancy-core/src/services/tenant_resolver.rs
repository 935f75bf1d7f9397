// ============================================================================
// Tenancy Core - Tenant Context Resolver
// File: crates/tenancy-core/src/services/tenant_resolver.rs
// ============================================================================
//! Per-request tenant resolution.
//!
//! Candidate signals, first present wins:
//!
//! 1. `tenant_id` claim of an authenticated identity (overrides a conflicting header)
//! 2. `X-Tenant-Id` header, when header resolution is enabled
//! 3. left-most host label, for hosts with more than two labels and a non-reserved label
//!    (or the whole host as a custom domain, when enabled)
//! 4. configured default code, never in production
//!
//! Exactly one candidate is looked up. A miss is `TenantUnresolved`; there is no
//! fallthrough to a lower-precedence signal.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use tenancy_shared::config::AppConfig;
use tenancy_shared::constants::DEFAULT_REGISTRY_TIMEOUT_MS;
use tenancy_shared::utils::{host_without_port, normalize_key};

use crate::domain::{AuthenticatedClaims, ResolutionSource, Tenant, TenantContext};
use crate::error::{DomainError, TenancyError};
use crate::services::{bounded_lookup, TenantRegistry};

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub accept_tenant_header: bool,
    pub default_tenant_code: Option<String>,
    pub reserved_labels: Vec<String>,
    pub custom_domains: bool,
    pub registry_timeout: Duration,
    pub production: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            accept_tenant_header: true,
            default_tenant_code: None,
            reserved_labels: vec!["www".to_string(), "api".to_string()],
            custom_domains: false,
            registry_timeout: Duration::from_millis(DEFAULT_REGISTRY_TIMEOUT_MS),
            production: false,
        }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let tenancy = &config.tenancy;
        Self {
            accept_tenant_header: tenancy.accept_tenant_header,
            default_tenant_code: tenancy
                .default_tenant_code
                .as_deref()
                .map(normalize_key)
                .filter(|c| !c.is_empty()),
            reserved_labels: tenancy.reserved_labels.iter().map(|l| normalize_key(l)).collect(),
            custom_domains: tenancy.custom_domains,
            registry_timeout: match tenancy.registry_timeout_ms {
                0 => Duration::from_millis(DEFAULT_REGISTRY_TIMEOUT_MS),
                ms => Duration::from_millis(ms),
            },
            production: config.is_production(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.production && self.default_tenant_code.is_some() {
            return Err(DomainError::ConfigurationError(
                "tenancy.default_tenant_code must not be set in production".to_string(),
            ));
        }
        Ok(())
    }
}

/// A tenant key chosen from the request signals, before lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    Id(Uuid),
    Code(String),
    Domain(String),
}

impl Candidate {
    /// Header and claim values may carry either the tenant UUID or its code.
    fn from_identifier(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match Uuid::parse_str(raw) {
            Ok(id) => Some(Candidate::Id(id)),
            Err(_) => Some(Candidate::Code(normalize_key(raw))),
        }
    }
}

pub struct TenantResolver {
    registry: Arc<TenantRegistry>,
    options: ResolverOptions,
}

impl TenantResolver {
    pub fn new(registry: Arc<TenantRegistry>, options: ResolverOptions) -> Result<Self, DomainError> {
        options.validate()?;
        Ok(Self { registry, options })
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve the tenant and company scope of one request.
    ///
    /// `claims` is `Some` only for authenticated requests; those must carry `company_id`.
    pub async fn resolve(
        &self,
        tenant_header: Option<&str>,
        claims: Option<&AuthenticatedClaims>,
        host: Option<&str>,
    ) -> Result<TenantContext, TenancyError> {
        let company_id = match claims {
            Some(claims) => match claims.company_id() {
                Some(company) => Some(company.to_string()),
                None => {
                    warn!("Authenticated request without company_id claim");
                    return Err(TenancyError::CompanyUnresolved);
                }
            },
            None => None,
        };

        let (candidate, source) = self
            .select_candidate(tenant_header, claims, host)
            .ok_or_else(|| {
                debug!("No tenant signal present on request");
                TenancyError::TenantUnresolved
            })?;

        let tenant = bounded_lookup(
            self.options.registry_timeout,
            "tenant",
            self.lookup(&candidate),
        )
        .await?;

        match tenant {
            Some(tenant) if tenant.is_active => {
                debug!(
                    tenant_id = %tenant.id,
                    tenant_code = %tenant.code,
                    source = source.as_str(),
                    "Tenant resolved"
                );
                Ok(TenantContext::new(tenant.id, tenant.code, company_id, source))
            }
            Some(tenant) => {
                warn!(tenant_code = %tenant.code, source = source.as_str(), "Resolved tenant is deactivated");
                Err(TenancyError::TenantUnresolved)
            }
            None => {
                warn!(candidate = ?candidate, source = source.as_str(), "No tenant matches request signal");
                Err(TenancyError::TenantUnresolved)
            }
        }
    }

    fn select_candidate(
        &self,
        tenant_header: Option<&str>,
        claims: Option<&AuthenticatedClaims>,
        host: Option<&str>,
    ) -> Option<(Candidate, ResolutionSource)> {
        let header = if self.options.accept_tenant_header {
            tenant_header.and_then(Candidate::from_identifier)
        } else {
            None
        };
        let claim = claims
            .and_then(|c| c.tenant_id())
            .and_then(Candidate::from_identifier);

        if let Some(claim) = claim {
            if let Some(header) = header.as_ref().filter(|h| **h != claim) {
                warn!(header = ?header, claim = ?claim, "Tenant header conflicts with token claim; using claim");
            }
            return Some((claim, ResolutionSource::Claim));
        }

        if let Some(header) = header {
            return Some((header, ResolutionSource::Header));
        }

        if let Some(host) = host {
            if let Some(code) = infer_subdomain_code(host, &self.options.reserved_labels) {
                return Some((Candidate::Code(code), ResolutionSource::Subdomain));
            }
            if self.options.custom_domains {
                if let Some(domain) = host_without_port(host).filter(|h| h.parse::<IpAddr>().is_err()) {
                    return Some((Candidate::Domain(domain), ResolutionSource::Domain));
                }
            }
        }

        if self.options.production {
            return None;
        }

        self.options
            .default_tenant_code
            .as_ref()
            .map(|code| (Candidate::Code(code.clone()), ResolutionSource::Default))
    }

    async fn lookup(&self, candidate: &Candidate) -> Result<Option<Tenant>, DomainError> {
        match candidate {
            Candidate::Id(id) => self.registry.lookup_by_id(id).await,
            Candidate::Code(code) => self.registry.lookup_by_code(code).await,
            Candidate::Domain(domain) => self.registry.lookup_by_domain(domain).await,
        }
    }
}

/// Tenant code implied by the host, e.g. `acme` for `acme.sphere.example.com`.
///
/// Requires more than two labels and a left-most label outside `reserved`.
pub fn infer_subdomain_code(host: &str, reserved: &[String]) -> Option<String> {
    let host = host_without_port(host)?;
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return None;
    }

    let first = labels[0];
    if first.is_empty() || reserved.iter().any(|r| r == first) {
        return None;
    }
    Some(first.to_string())
}
