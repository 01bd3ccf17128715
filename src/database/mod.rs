//! Database Layer
//!
//! SQLite-backed store for identities, profiles, campaigns, and characters.
//!
//! Access is split across two surfaces. [`Database`] itself exposes only the
//! elevated provisioning pathway ([`IdentityOps`]) used by the identity
//! subsystem before any user is authenticated. Everything else hangs off a
//! [`UserSession`] obtained from [`Database::session`], which binds an
//! identity id into every statement it issues. There is no unscoped way to
//! reach profile, campaign, or character rows.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

pub mod migrations;
pub mod models;

mod campaigns;
mod characters;
mod identities;
mod profiles;
mod session;

pub use campaigns::CampaignOps;
pub use characters::CharacterOps;
pub use identities::IdentityOps;
pub use models::{
    CampaignRecord, CharacterRecord, IdentityRecord, ProfileRecord, SignupEvent, SignupMetadata,
};
pub use profiles::ProfileOps;
pub use session::UserSession;

/// Database file name within the data directory
const DB_FILE: &str = "mythweaver.db";

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by the store.
///
/// Ownership misses on existing rows deliberately collapse into [`NotFound`]
/// so a caller cannot distinguish "someone else's row" from "no such row".
///
/// [`NotFound`]: StoreError::NotFound
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0} is already taken")]
    Conflict(String),

    #[error("row ownership does not match the authenticated identity")]
    Ownership,

    #[error("profile provisioning failed for identity {0}")]
    Provisioning(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("storyfire balance exhausted")]
    StoryfireExhausted,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Map a unique-index violation to [`StoreError::Conflict`], passing other
/// engine errors through unchanged.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> StoreError {
    let is_unique = err
        .as_database_error()
        .map_or(false, |e| e.is_unique_violation());
    if is_unique {
        StoreError::Conflict(what.to_string())
    } else {
        StoreError::Database(err)
    }
}

// ============================================================================
// Database Handle
// ============================================================================

/// Connection pool handle for the MythWeaver store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database under `data_dir` and bring the schema
    /// up to date.
    ///
    /// Foreign keys are enabled on every connection; the cascade behavior of
    /// identity deletion depends on it.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(sqlx::Error::Io)?;

        let db_path = data_dir.join(DB_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        info!(path = %db_path.display(), "Database ready");
        Ok(Self { pool })
    }

    /// Raw pool access for migrations and maintenance tooling.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bind an authenticated identity to a session-scoped handle.
    ///
    /// Credential validation happens upstream; the id passed here is trusted
    /// to be the authenticated caller's. Unauthenticated callers get no
    /// session and therefore no data access.
    pub fn session(&self, identity_id: impl Into<String>) -> UserSession {
        UserSession::new(self.clone(), identity_id.into())
    }
}
