//! Persistence for guild configuration: command prefixes and quorum rules.

pub mod models;
pub mod schema;

mod prefixes;
pub use self::prefixes::Prefixes;

mod quorum_scopes;
pub use self::quorum_scopes::{AddOutcome, DeleteOutcome, QuorumRule, QuorumScopes, UpdateOutcome};

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, HarnessWithOutput, MigrationHarness};
use parking_lot::Mutex;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!("./migrations");

/// The store couldn't complete an operation.
///
/// This is fatal for the operation that caused it, nothing is defaulted in its
/// place.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or a write failed.
    #[error("store unavailable")]
    Query(#[from] diesel::result::Error),
    /// The blocking task running the query was cancelled or panicked.
    #[error("store task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// Database abstraction.
#[derive(Clone)]
pub struct Database {
    pool: Arc<Mutex<SqliteConnection>>,
}

impl Database {
    /// Open the database at the given path, running any pending migrations.
    pub fn open(path: &Path) -> Result<Database> {
        let url = path.display().to_string();
        tracing::info!("Using database: {}", url);
        Self::establish(&url)
    }

    /// Open a private in-memory database.
    pub fn memory() -> Result<Database> {
        Self::establish(":memory:")
    }

    fn establish(url: &str) -> Result<Database> {
        let mut pool = SqliteConnection::establish(url)
            .with_context(|| anyhow!("failed to connect to database: {}", url))?;

        let mut output = Vec::new();

        // Run all migrations and provide some diagnostics on errors.
        let result: Result<()> = {
            let mut harness = HarnessWithOutput::new(&mut pool, &mut output);

            match harness.run_pending_migrations(MIGRATIONS) {
                Ok(..) => Ok(()),
                Err(e) => Err(anyhow!("{}", e)),
            }
        };

        let output = String::from_utf8_lossy(&output);
        result.with_context(|| anyhow!("error when running migrations: {}", output))?;

        if !output.is_empty() {
            tracing::trace!("Migrations output:\n{}", output);
        }

        Ok(Database {
            pool: Arc::new(Mutex::new(pool)),
        })
    }

    /// Run a blocking task with exclusive access to the connection.
    pub async fn asyncify<F, T, E>(&self, task: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        E: From<tokio::task::JoinError>,
    {
        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut guard = pool.lock();
            task(&mut guard)
        })
        .await;

        match result {
            Ok(result) => result,
            Err(e) => Err(E::from(e)),
        }
    }
}
