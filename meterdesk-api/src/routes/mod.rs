/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Account lifecycle, sessions, password flows
/// - `projects`: Owner-scoped projects and project tokens
/// - `services`: Catalog, attaching services, usage recording
/// - `admin`: Admin console (user management, catalog, deletions)
/// - `contacts`: Contact-form records
/// - `documentation`: Site documentation content

pub mod admin;
pub mod contacts;
pub mod documentation;
pub mod health;
pub mod projects;
pub mod services;
pub mod users;
