//! # Tenancy API
//!
//! HTTP surface: tenant-context middleware, license gates, extractors and the
//! tenant/entitlement endpoints.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extractors::{CurrentConnection, CurrentTenant};
pub use routes::{build_router, tenant_scope, trusted_tenant_scope};
pub use state::AppState;
