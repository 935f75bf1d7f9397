//! # Tenancy Core - Domain Module
//!
//! Domain entities for tenant resolution, routing and licensing.

pub mod tenant;
pub mod license;
pub mod context;
pub mod claims;
pub mod connection;
pub mod entitlement;

// Re-export all entities and enums
pub use tenant::Tenant;
pub use license::{License, LicenseType, FeatureFlags};
pub use context::{TenantContext, ResolutionSource};
pub use claims::AuthenticatedClaims;
pub use connection::{ConnectionDescriptor, ConnectionTarget};
pub use entitlement::{Capability, Decision, DenyReason, EntitlementSummary, Feature};
