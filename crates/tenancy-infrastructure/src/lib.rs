//! # Tenancy Infrastructure
//!
//! Store adapters for the core repository ports: PostgreSQL for deployments and
//! in-memory stores with the same uniqueness rules for tests and single-node runs.

pub mod database;
pub mod memory;

pub use database::{
    create_pool, run_migrations, PgConnectionDescriptorRepository, PgLicenseRepository, PgTenantRepository,
};
pub use memory::{InMemoryConnectionDescriptorRepository, InMemoryLicenseRepository, InMemoryTenantRepository};
