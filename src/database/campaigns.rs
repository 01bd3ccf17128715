//! Campaign database operations
//!
//! Owner-scoped CRUD for campaign instances and their progression state.
//! Progression counters are a ledger of current values: callers supply them,
//! the store only refuses values outside the valid range, and concurrent
//! writers resolve by last commit.

use std::collections::HashMap;

use sqlx::SqliteConnection;

use super::characters::insert_character;
use super::models::{CampaignRecord, CharacterRecord};
use super::{conflict_on_unique, Result, StoreError, UserSession};
use crate::core::rules;

/// Extension trait for campaign operations on an authenticated session
pub trait CampaignOps {
    /// Insert a campaign owned by the session identity.
    fn create_campaign(
        &self,
        campaign: &CampaignRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Insert a campaign and its starting character in one transaction,
    /// validating the character build first. Either both rows land or
    /// neither does.
    fn create_campaign_with_character(
        &self,
        campaign: &CampaignRecord,
        character: &CharacterRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn get_campaign(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<CampaignRecord>>> + Send;

    /// List the session owner's campaigns, newest first, optionally filtered
    /// by template.
    fn list_campaigns(
        &self,
        template_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<CampaignRecord>>> + Send;

    fn update_campaign(
        &self,
        campaign: &CampaignRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn delete_campaign(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl CampaignOps for UserSession {
    async fn create_campaign(&self, campaign: &CampaignRecord) -> Result<()> {
        if campaign.user_id != self.identity_id() {
            return Err(StoreError::Ownership);
        }
        validate_campaign(campaign)?;

        let mut conn = self.pool().acquire().await?;
        insert_campaign(&mut conn, campaign).await
    }

    async fn create_campaign_with_character(
        &self,
        campaign: &CampaignRecord,
        character: &CharacterRecord,
    ) -> Result<()> {
        if campaign.user_id != self.identity_id() {
            return Err(StoreError::Ownership);
        }
        validate_campaign(campaign)?;
        if character.campaign_id != campaign.id {
            return Err(StoreError::Constraint(
                "character must reference the new campaign".to_string(),
            ));
        }
        validate_character_build(character)?;

        let mut tx = self.pool().begin().await?;
        insert_campaign(&mut tx, campaign).await?;
        insert_character(&mut tx, character).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<CampaignRecord>> {
        let campaign = sqlx::query_as::<_, CampaignRecord>(
            "SELECT * FROM campaigns WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(self.identity_id())
        .fetch_optional(self.pool())
        .await?;
        Ok(campaign)
    }

    async fn list_campaigns(&self, template_id: Option<&str>) -> Result<Vec<CampaignRecord>> {
        let campaigns = if let Some(tid) = template_id {
            sqlx::query_as::<_, CampaignRecord>(
                "SELECT * FROM campaigns WHERE user_id = ? AND template_id = ? ORDER BY created_at DESC",
            )
            .bind(self.identity_id())
            .bind(tid)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, CampaignRecord>(
                "SELECT * FROM campaigns WHERE user_id = ? ORDER BY created_at DESC",
            )
            .bind(self.identity_id())
            .fetch_all(self.pool())
            .await?
        };
        Ok(campaigns)
    }

    async fn update_campaign(&self, campaign: &CampaignRecord) -> Result<()> {
        validate_campaign(campaign)?;

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET name = ?, template_id = ?, tone = ?, difficulty = ?,
                content_limits = ?, current_scene_number = ?, chapter_number = ?,
                total_advances = ?, current_location = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&campaign.name)
        .bind(&campaign.template_id)
        .bind(&campaign.tone)
        .bind(&campaign.difficulty)
        .bind(&campaign.content_limits)
        .bind(campaign.current_scene_number)
        .bind(campaign.chapter_number)
        .bind(campaign.total_advances)
        .bind(&campaign.current_location)
        .bind(&now)
        .bind(&campaign.id)
        .bind(self.identity_id())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_campaign(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(self.identity_id())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Insert a campaign row, stamping both audit columns server-side.
pub(super) async fn insert_campaign(
    conn: &mut SqliteConnection,
    campaign: &CampaignRecord,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO campaigns
        (id, user_id, name, template_id, tone, difficulty, content_limits,
         current_scene_number, chapter_number, total_advances, current_location,
         created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.user_id)
    .bind(&campaign.name)
    .bind(&campaign.template_id)
    .bind(&campaign.tone)
    .bind(&campaign.difficulty)
    .bind(&campaign.content_limits)
    .bind(campaign.current_scene_number)
    .bind(campaign.chapter_number)
    .bind(campaign.total_advances)
    .bind(&campaign.current_location)
    .bind(&now)
    .bind(&now)
    .execute(conn)
    .await
    .map_err(|e| conflict_on_unique(e, "campaign id"))?;
    Ok(())
}

/// Field checks shared by create and update.
fn validate_campaign(campaign: &CampaignRecord) -> Result<()> {
    if campaign.name.trim().is_empty() {
        return Err(StoreError::Constraint(
            "campaign name must not be empty".to_string(),
        ));
    }
    if campaign.current_scene_number < 1 {
        return Err(StoreError::Constraint(
            "current_scene_number must be at least 1".to_string(),
        ));
    }
    if campaign.chapter_number < 1 {
        return Err(StoreError::Constraint(
            "chapter_number must be at least 1".to_string(),
        ));
    }
    if campaign.total_advances < 0 {
        return Err(StoreError::Constraint(
            "total_advances must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// Creation-rules check for the starting character of a new campaign.
fn validate_character_build(character: &CharacterRecord) -> Result<()> {
    let skills: HashMap<String, i64> = serde_json::from_str(&character.skills_json)
        .map_err(|_| StoreError::Constraint("skills_json must be a JSON object".to_string()))?;
    let talents: Vec<serde_json::Value> = serde_json::from_str(&character.talents_json)
        .map_err(|_| StoreError::Constraint("talents_json must be a JSON array".to_string()))?;

    let attributes = [
        character.might_score,
        character.agility_score,
        character.wits_score,
        character.presence_score,
    ];
    rules::validate_character_build(&attributes, &skills, talents.len())
        .map_err(StoreError::Constraint)
}
