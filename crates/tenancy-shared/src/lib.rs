//! # Tenancy Shared
//! 
//! Configuration, telemetry, constants and small helpers shared by the tenancy crates.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use error::AppError;
