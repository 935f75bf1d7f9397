//! # Tenancy Security
//!
//! Bearer token handling. Turns a JWT into the claim set the tenant resolver reads.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
