//! SQLite connection pool and embedded schema migrations.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas executed on every connection handed out by the pool.
///
/// Foreign keys must be on for tenant rows to cascade and for dangling
/// customer/user references to be rejected.
#[derive(Debug, Clone)]
pub struct SqlitePragmas {
    pub wal: bool,
    pub foreign_keys: bool,
    pub busy_timeout: Duration,
}

impl Default for SqlitePragmas {
    fn default() -> Self {
        Self {
            wal: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl SqlitePragmas {
    fn statements(&self) -> String {
        let mut sql = String::new();
        if self.wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; ");
        }
        if self.foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON; ");
        }
        sql.push_str(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ));
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.statements())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool for `database_url` with the default pragmas.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas::default()))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().map_err(|err| {
        log::error!("Failed to check out a database connection: {err}");
        err
    })
}

#[cfg(feature = "server")]
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};

#[cfg(feature = "server")]
mod migrations {
    use diesel::r2d2::PoolError;
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
    use thiserror::Error;

    use super::{DbPool, get_connection};

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    #[derive(Debug, Error)]
    pub enum MigrationError {
        #[error("no database connection: {0}")]
        Connection(#[from] PoolError),

        #[error("migration failed: {0}")]
        Apply(#[source] Box<dyn std::error::Error + Send + Sync>),
    }

    /// Applies every pending migration, returning how many were run.
    pub fn run_pending_migrations(pool: &DbPool) -> Result<usize, MigrationError> {
        let mut conn = get_connection(pool)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(MigrationError::Apply)?;
        Ok(applied.len())
    }
}
