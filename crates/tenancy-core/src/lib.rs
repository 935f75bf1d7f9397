//! # Tenancy Core
//! 
//! Domain entities, repository traits and the request-path services that decide
//! which tenant a request belongs to, where its data lives and what its license allows.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, TenancyError};
