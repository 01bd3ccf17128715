//! Core Entity Records
//!
//! Database records for identities, profiles, campaigns, and characters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::rules;

// ============================================================================
// Identity Record
// ============================================================================

/// Identity database record.
///
/// Mirrors the external auth subsystem's user record; referenced by the
/// profile sharing its id, never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdentityRecord {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

// ============================================================================
// Signup Event
// ============================================================================

/// Optional metadata attached to a signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Identity-creation event emitted by the auth subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupEvent {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub metadata: SignupMetadata,
}

impl SignupEvent {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            metadata: SignupMetadata::default(),
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.metadata.full_name = Some(full_name.into());
        self
    }
}

// ============================================================================
// Profile Record
// ============================================================================

/// Profile database record, provisioned automatically per identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRecord {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
    pub storyfire_balance: i64,
    pub last_storyfire_reset: String,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Campaign Record
// ============================================================================

/// Campaign database record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub template_id: String,
    pub tone: String,
    pub difficulty: String,
    pub content_limits: String, // JSON
    pub current_scene_number: i64,
    pub chapter_number: i64,
    pub total_advances: i64,
    pub current_location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CampaignRecord {
    pub fn new(user_id: String, name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            template_id: "broken_kingdom".to_string(),
            tone: "balanced".to_string(),
            difficulty: "normal".to_string(),
            content_limits: "[]".to_string(),
            current_scene_number: 1,
            chapter_number: 1,
            total_advances: 0,
            current_location: Some("The Crossroads Inn".to_string()),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ============================================================================
// Character Record
// ============================================================================

/// Character database record, one per campaign
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CharacterRecord {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub origin: String, // e.g. "Street Urchin", "Veteran", "Acolyte"
    pub path: String,   // e.g. "Blade", "Shadow", "Mystic"
    pub might_score: i64,
    pub agility_score: i64,
    pub wits_score: i64,
    pub presence_score: i64,
    pub current_hp: i64,
    pub max_hp: i64,
    pub current_focus: i64,
    pub max_focus: i64,
    pub supplies: i64,
    pub skills_json: String,    // {"Blade": 8, "Sneak": 4, ...}
    pub talents_json: String,   // [{"name": ..., "cost": ...}, ...]
    pub bonds_json: String,     // [{"text": ..., "established_scene": ...}, ...]
    pub inventory_json: String, // [{"name": ..., "equipped": ...}, ...]
    pub created_at: String,
    pub updated_at: String,
}

impl CharacterRecord {
    /// Build a fresh character at full resources, HP and focus derived from
    /// the attribute spread.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaign_id: String,
        name: String,
        origin: String,
        path: String,
        might_score: i64,
        agility_score: i64,
        wits_score: i64,
        presence_score: i64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let max_hp = rules::max_hp(might_score);
        let max_focus = rules::max_focus(wits_score, presence_score);
        Self {
            id: Uuid::new_v4().to_string(),
            campaign_id,
            name,
            origin,
            path,
            might_score,
            agility_score,
            wits_score,
            presence_score,
            current_hp: max_hp,
            max_hp,
            current_focus: max_focus,
            max_focus,
            supplies: 3,
            skills_json: "{}".to_string(),
            talents_json: "[]".to_string(),
            bonds_json: "[]".to_string(),
            inventory_json: "[]".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Effective Attribute Bonus for Might
    pub fn might_bonus(&self) -> i64 {
        rules::attribute_bonus(self.might_score)
    }

    /// Effective Attribute Bonus for Agility
    pub fn agility_bonus(&self) -> i64 {
        rules::attribute_bonus(self.agility_score)
    }

    /// Effective Attribute Bonus for Wits
    pub fn wits_bonus(&self) -> i64 {
        rules::attribute_bonus(self.wits_score)
    }

    /// Effective Attribute Bonus for Presence
    pub fn presence_bonus(&self) -> i64 {
        rules::attribute_bonus(self.presence_score)
    }

    /// Inventory slots derived from Might
    pub fn inventory_slots(&self) -> i64 {
        rules::inventory_slots(self.might_score)
    }
}
