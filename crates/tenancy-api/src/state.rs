//! Shared application state

use std::sync::Arc;

use tenancy_core::error::DomainError;
use tenancy_core::repositories::{ConnectionDescriptorRepository, LicenseRepository, TenantRepository};
use tenancy_core::services::{
    ConnectionRouter, EntitlementGuard, LicenseRegistry, ProvisioningService, ResolverOptions,
    TenantRegistry, TenantResolver,
};
use tenancy_security::JwtService;
use tenancy_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<TenantResolver>,
    pub router: Arc<ConnectionRouter>,
    pub guard: Arc<EntitlementGuard>,
    pub provisioning: Arc<ProvisioningService>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    /// Wire the services over the given stores.
    ///
    /// Fails when the tenancy settings are unsafe for the environment, e.g. a
    /// default tenant code in production.
    pub fn new(
        config: AppConfig,
        tenants: Arc<dyn TenantRepository>,
        licenses: Arc<dyn LicenseRepository>,
        descriptors: Arc<dyn ConnectionDescriptorRepository>,
    ) -> Result<Self, DomainError> {
        let options = ResolverOptions::from_config(&config);
        let lookup_timeout = options.registry_timeout;

        let tenant_registry = Arc::new(TenantRegistry::new(Arc::clone(&tenants)));
        let license_registry = Arc::new(LicenseRegistry::new(licenses, tenants));
        let resolver = Arc::new(TenantResolver::new(Arc::clone(&tenant_registry), options)?);
        let router = Arc::new(ConnectionRouter::from_config(Arc::clone(&descriptors), &config));
        let guard = Arc::new(EntitlementGuard::new(Arc::clone(&license_registry), lookup_timeout));
        let provisioning = Arc::new(ProvisioningService::new(
            tenant_registry,
            license_registry,
            descriptors,
            Arc::clone(&router),
        ));
        let jwt = Arc::new(JwtService::from_config(&config));

        Ok(Self {
            config: Arc::new(config),
            resolver,
            router,
            guard,
            provisioning,
            jwt,
        })
    }
}
