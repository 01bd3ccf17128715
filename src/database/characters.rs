//! Character database operations
//!
//! One character per campaign. Rows carry no owner column of their own;
//! every statement reaches them through the owning campaign, so isolation
//! follows the campaign's `user_id` transitively.

use sqlx::SqliteConnection;

use super::models::CharacterRecord;
use super::{conflict_on_unique, Result, StoreError, UserSession};

/// Extension trait for character operations on an authenticated session
pub trait CharacterOps {
    /// Insert a character under one of the session owner's campaigns.
    /// Targeting a campaign the session does not own reads as not-found.
    fn create_character(
        &self,
        character: &CharacterRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn get_character(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<CharacterRecord>>> + Send;

    /// Fetch the character attached to a campaign, if any.
    fn get_campaign_character(
        &self,
        campaign_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<CharacterRecord>>> + Send;

    fn update_character(
        &self,
        character: &CharacterRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn delete_character(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl CharacterOps for UserSession {
    async fn create_character(&self, character: &CharacterRecord) -> Result<()> {
        validate_character(character)?;

        let now = chrono::Utc::now().to_rfc3339();
        // Guarded insert: the row only lands when the target campaign belongs
        // to this session's identity.
        let result = sqlx::query(
            r#"
            INSERT INTO characters
            (id, campaign_id, name, origin, path,
             might_score, agility_score, wits_score, presence_score,
             current_hp, max_hp, current_focus, max_focus, supplies,
             skills_json, talents_json, bonds_json, inventory_json,
             created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM campaigns WHERE id = ? AND user_id = ?)
            "#,
        )
        .bind(&character.id)
        .bind(&character.campaign_id)
        .bind(&character.name)
        .bind(&character.origin)
        .bind(&character.path)
        .bind(character.might_score)
        .bind(character.agility_score)
        .bind(character.wits_score)
        .bind(character.presence_score)
        .bind(character.current_hp)
        .bind(character.max_hp)
        .bind(character.current_focus)
        .bind(character.max_focus)
        .bind(character.supplies)
        .bind(&character.skills_json)
        .bind(&character.talents_json)
        .bind(&character.bonds_json)
        .bind(&character.inventory_json)
        .bind(&now)
        .bind(&now)
        .bind(&character.campaign_id)
        .bind(self.identity_id())
        .execute(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "campaign character slot"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_character(&self, id: &str) -> Result<Option<CharacterRecord>> {
        let character = sqlx::query_as::<_, CharacterRecord>(
            r#"
            SELECT c.* FROM characters c
            JOIN campaigns g ON g.id = c.campaign_id
            WHERE c.id = ? AND g.user_id = ?
            "#,
        )
        .bind(id)
        .bind(self.identity_id())
        .fetch_optional(self.pool())
        .await?;
        Ok(character)
    }

    async fn get_campaign_character(&self, campaign_id: &str) -> Result<Option<CharacterRecord>> {
        let character = sqlx::query_as::<_, CharacterRecord>(
            r#"
            SELECT c.* FROM characters c
            JOIN campaigns g ON g.id = c.campaign_id
            WHERE c.campaign_id = ? AND g.user_id = ?
            "#,
        )
        .bind(campaign_id)
        .bind(self.identity_id())
        .fetch_optional(self.pool())
        .await?;
        Ok(character)
    }

    async fn update_character(&self, character: &CharacterRecord) -> Result<()> {
        validate_character(character)?;

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE characters
            SET name = ?, origin = ?, path = ?,
                might_score = ?, agility_score = ?, wits_score = ?, presence_score = ?,
                current_hp = ?, max_hp = ?, current_focus = ?, max_focus = ?, supplies = ?,
                skills_json = ?, talents_json = ?, bonds_json = ?, inventory_json = ?,
                updated_at = ?
            WHERE id = ?
              AND campaign_id IN (SELECT id FROM campaigns WHERE user_id = ?)
            "#,
        )
        .bind(&character.name)
        .bind(&character.origin)
        .bind(&character.path)
        .bind(character.might_score)
        .bind(character.agility_score)
        .bind(character.wits_score)
        .bind(character.presence_score)
        .bind(character.current_hp)
        .bind(character.max_hp)
        .bind(character.current_focus)
        .bind(character.max_focus)
        .bind(character.supplies)
        .bind(&character.skills_json)
        .bind(&character.talents_json)
        .bind(&character.bonds_json)
        .bind(&character.inventory_json)
        .bind(&now)
        .bind(&character.id)
        .bind(self.identity_id())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_character(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM characters
            WHERE id = ?
              AND campaign_id IN (SELECT id FROM campaigns WHERE user_id = ?)
            "#,
        )
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

/// Insert a character row without an ownership guard; callers have already
/// established that the enclosing campaign belongs to the session.
pub(super) async fn insert_character(
    conn: &mut SqliteConnection,
    character: &CharacterRecord,
) -> Result<()> {
    validate_character(character)?;

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO characters
        (id, campaign_id, name, origin, path,
         might_score, agility_score, wits_score, presence_score,
         current_hp, max_hp, current_focus, max_focus, supplies,
         skills_json, talents_json, bonds_json, inventory_json,
         created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&character.id)
    .bind(&character.campaign_id)
    .bind(&character.name)
    .bind(&character.origin)
    .bind(&character.path)
    .bind(character.might_score)
    .bind(character.agility_score)
    .bind(character.wits_score)
    .bind(character.presence_score)
    .bind(character.current_hp)
    .bind(character.max_hp)
    .bind(character.current_focus)
    .bind(character.max_focus)
    .bind(character.supplies)
    .bind(&character.skills_json)
    .bind(&character.talents_json)
    .bind(&character.bonds_json)
    .bind(&character.inventory_json)
    .bind(&now)
    .bind(&now)
    .execute(conn)
    .await
    .map_err(|e| conflict_on_unique(e, "campaign character slot"))?;
    Ok(())
}

fn validate_character(character: &CharacterRecord) -> Result<()> {
    if character.name.trim().is_empty() {
        return Err(StoreError::Constraint(
            "character name must not be empty".to_string(),
        ));
    }
    let scores = [
        character.might_score,
        character.agility_score,
        character.wits_score,
        character.presence_score,
    ];
    if scores.iter().any(|&score| score < 0) {
        return Err(StoreError::Constraint(
            "attribute scores must be non-negative".to_string(),
        ));
    }
    if character.supplies < 0 {
        return Err(StoreError::Constraint(
            "supplies must be non-negative".to_string(),
        ));
    }
    Ok(())
}
