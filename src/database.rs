//! Connection pool setup. Migrations run when the pool is opened.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::*;

use crate::errors::DataError;

pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

/// Applied to every connection the pool hands out.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Storage handle shared by every request. Cloning is cheap, clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Open (creating if needed) the sqlite database at `database_url`.
    pub fn open(database_url: &str) -> Result<Database, DataError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = r2d2::Pool::builder()
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout_ms: 5000,
            }))
            .build(manager)?;

        {
            let mut conn = pool.get()?;
            run_migration_on(&mut conn)?;
        }
        info!("Database pool initialized at {}", database_url);

        Ok(Database { pool })
    }

    /// Check out a pooled connection. It returns to the pool on drop.
    pub(crate) fn connection(&self) -> Result<PooledConnection, DataError> {
        self.pool.get().map_err(From::from)
    }
}

fn run_migration_on(conn: &mut SqliteConnection) -> Result<(), DataError> {
    info!("Running DB Migrations...");
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| debug!("Applied {} migration(s)", applied.len()))
        .map_err(|err| DataError::Migration(err.to_string()))
}

/// Fresh database on a temp file. Keep the returned file alive for the test's duration.
#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::NamedTempFile, Database) {
    let file = tempfile::Builder::new()
        .suffix("-lateshow.db")
        .tempfile()
        .unwrap();
    let db = Database::open(file.path().to_str().unwrap()).unwrap();
    (file, db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{appearances, episodes, guests};

    #[test]
    fn open_runs_migrations() {
        let (_file, db) = test_db();
        let mut conn = db.connection().unwrap();

        let counts: (i64, i64, i64) = (
            episodes::table.count().get_result(&mut conn).unwrap(),
            guests::table.count().get_result(&mut conn).unwrap(),
            appearances::table.count().get_result(&mut conn).unwrap(),
        );
        assert_eq!(counts, (0, 0, 0));
    }

    #[test]
    fn reopen_is_idempotent() {
        let (file, _db) = test_db();
        Database::open(file.path().to_str().unwrap()).unwrap();
    }
}
