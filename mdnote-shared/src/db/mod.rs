/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: database creation, schema migrations and seed rows
///
/// Models and their queries live in the crate-level `models` module.

pub mod migrations;
pub mod pool;
