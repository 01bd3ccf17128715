//! Identity provisioning operations
//!
//! The signup pathway: consumes identity-creation events from the auth
//! subsystem and provisions the dependent profile row in the same
//! transaction. Runs on the bare [`Database`] handle because no user session
//! exists yet at signup time.

use tracing::{info, warn};

use super::models::{IdentityRecord, ProfileRecord, SignupEvent};
use super::{conflict_on_unique, Database, Result, StoreError};

/// Extension trait for identity provisioning operations
pub trait IdentityOps {
    /// Record a new identity and provision its profile atomically.
    ///
    /// Either both rows exist after this call or neither does. Returns the
    /// freshly provisioned profile.
    fn create_identity(
        &self,
        signup: &SignupEvent,
    ) -> impl std::future::Future<Output = Result<ProfileRecord>> + Send;

    fn get_identity(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<IdentityRecord>>> + Send;

    /// Remove an identity; the profile, its campaigns, and their characters
    /// cascade away with it.
    fn delete_identity(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl IdentityOps for Database {
    async fn create_identity(&self, signup: &SignupEvent) -> Result<ProfileRecord> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool().begin().await?;

        sqlx::query("INSERT INTO identities (id, email, created_at) VALUES (?, ?, ?)")
            .bind(&signup.id)
            .bind(&signup.email)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "identity"))?;

        // Remaining columns (storyfire balance, premium flag) come from the
        // schema defaults. Any failure here aborts the signup as a whole; an
        // identity must never exist without its profile.
        let provisioned = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, last_storyfire_reset, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&signup.id)
        .bind(&signup.email)
        .bind(&signup.metadata.full_name)
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await;

        if let Err(e) = provisioned {
            warn!(identity_id = %signup.id, error = %e, "Profile provisioning failed, rolling back signup");
            return Err(StoreError::Provisioning(signup.id.clone()));
        }

        let profile = sqlx::query_as::<_, ProfileRecord>("SELECT * FROM profiles WHERE id = ?")
            .bind(&signup.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(identity_id = %signup.id, "Provisioned profile for new identity");
        Ok(profile)
    }

    async fn get_identity(&self, id: &str) -> Result<Option<IdentityRecord>> {
        let identity = sqlx::query_as::<_, IdentityRecord>("SELECT * FROM identities WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(identity)
    }

    async fn delete_identity(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM identities WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        info!(identity_id = %id, "Deleted identity and cascaded owned rows");
        Ok(())
    }
}
