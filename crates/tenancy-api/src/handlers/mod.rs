//! HTTP handlers

pub mod health;
pub mod tenant;
pub mod entitlements;
