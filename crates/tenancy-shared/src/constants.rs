//! Application-wide constants
//!
//! Header and claim names are a stable contract with clients and identity providers.

pub const TENANT_HEADER: &str = "X-Tenant-Id";
pub const TENANT_CLAIM: &str = "tenant_id";
pub const COMPANY_CLAIM: &str = "company_id";

pub const DEFAULT_RESERVED_LABELS: [&str; 2] = ["www", "api"];
pub const DEFAULT_REGISTRY_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900;
pub const TOKEN_TYPE_ACCESS: &str = "access";

pub const ENV_PRODUCTION: &str = "production";

/// Seconds a client should wait before retrying a request that hit an unavailable registry.
pub const RETRY_AFTER_SECS: u64 = 1;
