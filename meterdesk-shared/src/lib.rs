//! # Meterdesk Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the Meterdesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Token issuance/verification, password hashing, reset tokens
//! - `db`: Connection pool and migrations
//! - `email`: Outbound mail interface

pub mod auth;
pub mod db;
pub mod email;
pub mod models;

/// Current version of the Meterdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
