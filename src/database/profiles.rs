//! Profile database operations
//!
//! Per-user account state: username, premium flag, and the storyfire
//! balance. Rows are created only by provisioning and deleted only by the
//! identity cascade; a session can read and update exactly its own row.

use super::models::ProfileRecord;
use super::{conflict_on_unique, Result, StoreError, UserSession};

/// Extension trait for profile operations on an authenticated session
pub trait ProfileOps {
    /// Fetch the session owner's profile.
    fn get_profile(&self) -> impl std::future::Future<Output = Result<ProfileRecord>> + Send;

    /// Update the session owner's profile.
    ///
    /// Writable columns: username, full_name, avatar_url, is_premium,
    /// storyfire_balance, last_storyfire_reset. The email mirrors the
    /// identity record and `updated_at` is stamped by the store; values
    /// supplied for either are ignored.
    fn update_profile(
        &self,
        profile: &ProfileRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Deduct `cost` storyfire from the owner's balance and return the new
    /// balance. Premium profiles are never charged. An insufficient balance
    /// leaves the row untouched.
    fn spend_storyfire(&self, cost: i64) -> impl std::future::Future<Output = Result<i64>> + Send;

    /// Set the balance to `amount` and mark the reset time. The replenishment
    /// schedule lives with the caller; this is only the primitive.
    fn reset_storyfire(&self, amount: i64) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl ProfileOps for UserSession {
    async fn get_profile(&self) -> Result<ProfileRecord> {
        sqlx::query_as::<_, ProfileRecord>("SELECT * FROM profiles WHERE id = ?")
            .bind(self.identity_id())
            .fetch_optional(self.pool())
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_profile(&self, profile: &ProfileRecord) -> Result<()> {
        if profile.id != self.identity_id() {
            return Err(StoreError::Ownership);
        }
        if profile.storyfire_balance < 0 {
            return Err(StoreError::Constraint(
                "storyfire_balance must be non-negative".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET username = ?, full_name = ?, avatar_url = ?, is_premium = ?,
                storyfire_balance = ?, last_storyfire_reset = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.username)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(profile.is_premium)
        .bind(profile.storyfire_balance)
        .bind(&profile.last_storyfire_reset)
        .bind(&now)
        .bind(self.identity_id())
        .execute(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn spend_storyfire(&self, cost: i64) -> Result<i64> {
        if cost < 0 {
            return Err(StoreError::Constraint(
                "storyfire cost must be non-negative".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        // Guarded single-statement deduction; concurrent spends serialize on
        // the row and cannot drive the balance negative.
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET storyfire_balance = storyfire_balance - ?, updated_at = ?
            WHERE id = ? AND is_premium = 0 AND storyfire_balance >= ?
            "#,
        )
        .bind(cost)
        .bind(&now)
        .bind(self.identity_id())
        .bind(cost)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            let profile = self.get_profile().await?;
            if profile.is_premium {
                return Ok(profile.storyfire_balance);
            }
            return Err(StoreError::StoryfireExhausted);
        }

        let profile = self.get_profile().await?;
        Ok(profile.storyfire_balance)
    }

    async fn reset_storyfire(&self, amount: i64) -> Result<()> {
        if amount < 0 {
            return Err(StoreError::Constraint(
                "storyfire amount must be non-negative".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET storyfire_balance = ?, last_storyfire_reset = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(amount)
        .bind(&now)
        .bind(&now)
        .bind(self.identity_id())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
