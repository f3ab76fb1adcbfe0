/// Authentication utilities
///
/// This module provides the authentication primitives for Meterdesk:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT token generation and validation for the user and project realms
/// - [`reset`]: Password-reset token generation and digest verification
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, separate access/refresh secrets, explicit
///   audience claims so a user token can never stand in for a project token
/// - **Reset Tokens**: 32 random bytes, only the SHA-256 digest is stored
/// - **Constant-time Comparison**: All verification uses constant-time operations
pub mod jwt;
pub mod password;
pub mod reset;
