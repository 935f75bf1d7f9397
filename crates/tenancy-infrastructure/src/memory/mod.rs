//! In-memory stores
//!
//! Same uniqueness and one-active-license rules as the PostgreSQL schema, held in
//! `parking_lot` locks. No lock is held across an await point.

pub mod tenant_repo;
pub mod license_repo;
pub mod connection_repo;

pub use tenant_repo::InMemoryTenantRepository;
pub use license_repo::InMemoryLicenseRepository;
pub use connection_repo::InMemoryConnectionDescriptorRepository;
