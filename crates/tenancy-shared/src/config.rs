//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_REGISTRY_TIMEOUT_MS, DEFAULT_RESERVED_LABELS,
    ENV_PRODUCTION,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub tenancy: TenancySettings,
    #[serde(default)]
    pub routing: RoutingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Browser origins allowed by CORS. Empty allows none.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
}

/// Tenant resolution settings
#[derive(Debug, Deserialize, Clone)]
pub struct TenancySettings {
    pub accept_tenant_header: bool,
    /// Fallback code for non-production environments only.
    #[serde(default)]
    pub default_tenant_code: Option<String>,
    pub reserved_labels: Vec<String>,
    pub custom_domains: bool,
    pub registry_timeout_ms: u64,
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for TenancySettings {
    fn default() -> Self {
        Self {
            accept_tenant_header: true,
            default_tenant_code: None,
            reserved_labels: DEFAULT_RESERVED_LABELS.iter().map(|s| s.to_string()).collect(),
            custom_domains: false,
            registry_timeout_ms: DEFAULT_REGISTRY_TIMEOUT_MS,
            seed_file: None,
        }
    }
}

/// Shared connection target used when a tenant has no dedicated descriptor
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutingSettings {
    #[serde(default)]
    pub default_dsn: Option<String>,
    #[serde(default)]
    pub default_schema: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.clone())?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "tenancy-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("tenancy.accept_tenant_header", true)?
            .set_default("tenancy.reserved_labels", DEFAULT_RESERVED_LABELS.to_vec())?
            .set_default("tenancy.custom_domains", false)?
            .set_default("tenancy.registry_timeout_ms", DEFAULT_REGISTRY_TIMEOUT_MS)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case(ENV_PRODUCTION)
    }
}
