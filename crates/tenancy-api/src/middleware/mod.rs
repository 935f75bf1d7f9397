//! Request middleware

pub mod tenant_context;
pub mod entitlement;

pub use tenant_context::{tenant_context_middleware, trusted_tenant_context_middleware};
pub use entitlement::require_feature;
