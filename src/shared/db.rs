//! Embedded schema migrations. Connection management and query execution
//! stay with the consumer; this module only exposes the DDL and a harness
//! entry point so a deployment can apply it.

use anyhow::{anyhow, Result};
use diesel::pg::Pg;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies every pending migration, returning the applied versions.
pub fn run_pending_migrations(conn: &mut impl MigrationHarness<Pg>) -> Result<Vec<String>> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("running migrations: {e}"))?;
    Ok(applied.iter().map(ToString::to_string).collect())
}
