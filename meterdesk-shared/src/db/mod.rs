/// Database layer
///
/// - `pool`: PostgreSQL connection pool built on sqlx
/// - `migrations`: schema migration runner
pub mod migrations;
pub mod pool;
