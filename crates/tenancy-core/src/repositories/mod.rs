//! Repository traits (ports)

pub mod tenant_repository;
pub mod license_repository;
pub mod connection_repository;

pub use tenant_repository::TenantRepository;
pub use license_repository::LicenseRepository;
pub use connection_repository::ConnectionDescriptorRepository;

#[cfg(test)]
pub use tenant_repository::MockTenantRepository;
#[cfg(test)]
pub use license_repository::MockLicenseRepository;
#[cfg(test)]
pub use connection_repository::MockConnectionDescriptorRepository;
