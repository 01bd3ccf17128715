//! Authenticated Session Scope
//!
//! All profile, campaign, and character operations are defined on
//! [`UserSession`] rather than on the bare database handle, so every
//! statement the store issues carries the caller's identity in its ownership
//! predicate. Omitting the check is not possible by construction.

use sqlx::sqlite::SqlitePool;

use super::Database;

/// Identity-bound database handle.
///
/// Cheap to create and clone; holds no locks. Two sessions for the same
/// identity may update the same row concurrently; the engine serializes row
/// writes and the last commit wins.
#[derive(Debug, Clone)]
pub struct UserSession {
    db: Database,
    identity_id: String,
}

impl UserSession {
    pub(super) fn new(db: Database, identity_id: String) -> Self {
        Self { db, identity_id }
    }

    /// The authenticated identity this session acts as.
    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub(super) fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }
}
