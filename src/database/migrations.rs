//! Database Migrations
//!
//! Handles schema creation and versioned migrations.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{info, warn};

/// Current database schema version
pub const SCHEMA_VERSION: i32 = 3;

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create migrations table if it doesn't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Get current version
    let current_version = current_version(pool).await?;

    info!(current_version, target_version = SCHEMA_VERSION, "Checking database migrations");

    if current_version < SCHEMA_VERSION {
        info!("Running database migrations from v{} to v{}", current_version, SCHEMA_VERSION);

        // Run migrations in order
        for version in (current_version + 1)..=SCHEMA_VERSION {
            run_migration(pool, version).await?;
        }

        info!("Database migrations completed successfully");
    }

    Ok(())
}

/// Get the current schema version
pub async fn current_version(pool: &SqlitePool) -> Result<i32, sqlx::Error> {
    let result = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(result
        .and_then(|row| row.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

/// Run a specific migration version
async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let (name, sql) = match version {
        1 => ("initial_schema", MIGRATION_V1),
        2 => ("characters_table", MIGRATION_V2),
        3 => ("campaign_current_location", MIGRATION_V3),
        _ => {
            warn!("Unknown migration version: {}", version);
            return Ok(());
        }
    };

    info!("Applying migration v{}: {}", version, name);

    // Execute migration SQL
    for statement in sql.split(";").filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement.trim()).execute(pool).await?;
    }

    // Record migration
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Migration v1: Initial schema
const MIGRATION_V1: &str = r#"
-- Identities table. Rows here are owned by the external auth subsystem;
-- this core only ever inserts alongside a profile and deletes on account
-- removal.
CREATE TABLE IF NOT EXISTS identities (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- Profiles table, one per identity (shared primary key)
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    username TEXT,
    email TEXT NOT NULL,
    full_name TEXT,
    avatar_url TEXT,
    is_premium INTEGER NOT NULL DEFAULT 0,
    storyfire_balance INTEGER NOT NULL DEFAULT 40,
    last_storyfire_reset TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (id) REFERENCES identities(id) ON DELETE CASCADE
);

-- Multiple NULL usernames are allowed, but set usernames must be unique
CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_username ON profiles(username);

-- Campaigns table
CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    template_id TEXT NOT NULL DEFAULT 'broken_kingdom',
    tone TEXT NOT NULL DEFAULT 'balanced',
    difficulty TEXT NOT NULL DEFAULT 'normal',
    content_limits TEXT NOT NULL DEFAULT '[]',
    current_scene_number INTEGER NOT NULL DEFAULT 1 CHECK (current_scene_number >= 1),
    chapter_number INTEGER NOT NULL DEFAULT 1 CHECK (chapter_number >= 1),
    total_advances INTEGER NOT NULL DEFAULT 0 CHECK (total_advances >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_campaigns_user ON campaigns(user_id);
CREATE INDEX IF NOT EXISTS idx_campaigns_user_created ON campaigns(user_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_campaigns_template ON campaigns(template_id)
"#;

/// Migration v2: Characters table
const MIGRATION_V2: &str = r#"
-- Characters table, one per campaign
CREATE TABLE IF NOT EXISTS characters (
    id TEXT PRIMARY KEY,
    campaign_id TEXT NOT NULL,
    name TEXT NOT NULL,
    origin TEXT NOT NULL,
    path TEXT NOT NULL,
    might_score INTEGER NOT NULL DEFAULT 0,
    agility_score INTEGER NOT NULL DEFAULT 0,
    wits_score INTEGER NOT NULL DEFAULT 0,
    presence_score INTEGER NOT NULL DEFAULT 0,
    current_hp INTEGER NOT NULL,
    max_hp INTEGER NOT NULL,
    current_focus INTEGER NOT NULL,
    max_focus INTEGER NOT NULL,
    supplies INTEGER NOT NULL DEFAULT 3,
    skills_json TEXT NOT NULL DEFAULT '{}',
    talents_json TEXT NOT NULL DEFAULT '[]',
    bonds_json TEXT NOT NULL DEFAULT '[]',
    inventory_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (campaign_id) REFERENCES campaigns(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_characters_campaign ON characters(campaign_id)
"#;

/// Migration v3: Track the party's current location per campaign
const MIGRATION_V3: &str = r#"
ALTER TABLE campaigns ADD COLUMN current_location TEXT DEFAULT 'The Crossroads Inn'
"#;
