use crate::domain::tts::{KeyTier, SynthesisKey};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Store contract the key pool rotates over.
///
/// `record_usage` must be an atomic increment at the persistence layer:
/// concurrent jobs charging the same key may never lose an update.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Pick the least-used enabled key with quota left, skipping `excluded`.
    /// Ties break on oldest `last_used_at` (never-used first), then name.
    async fn select_key(&self, excluded: &[String]) -> AppResult<Option<SynthesisKey>>;

    /// Charge characters to a key and stamp `last_used_at`.
    async fn record_usage(&self, key_name: &str, characters: i32) -> AppResult<()>;

    /// Stamp `last_checked_at` after a failed attempt against the key.
    async fn touch_checked(&self, key_name: &str) -> AppResult<()>;
}

/// Values for a new admin-created key.
#[derive(Debug, Clone)]
pub struct NewSynthesisKey {
    pub name: String,
    pub secret: String,
    pub character_limit: i32,
    pub tier: KeyTier,
    pub notes: Option<String>,
}

pub struct KeyRepository {
    pool: Arc<DbPool>,
}

impl KeyRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// List all keys, newest first.
    pub async fn list(&self) -> AppResult<Vec<SynthesisKey>> {
        let keys = sqlx::query_as::<_, SynthesisKey>(
            r#"
            SELECT id, name, secret, used_characters, character_limit, enabled, tier,
                   last_used_at, last_checked_at, notes, created_at, updated_at
            FROM synthesis_keys
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(keys)
    }

    pub async fn create(&self, new_key: NewSynthesisKey) -> AppResult<SynthesisKey> {
        let now = Utc::now();

        let key = sqlx::query_as::<_, SynthesisKey>(
            r#"
            INSERT INTO synthesis_keys
                (id, name, secret, used_characters, character_limit, enabled, tier, notes, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, TRUE, $5, $6, $7, $7)
            RETURNING id, name, secret, used_characters, character_limit, enabled, tier,
                      last_used_at, last_checked_at, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_key.name)
        .bind(&new_key.secret)
        .bind(new_key.character_limit)
        .bind(new_key.tier)
        .bind(&new_key.notes)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return AppError::Conflict(format!("key '{}' already exists", new_key.name));
                }
            }
            AppError::Database(e)
        })?;

        Ok(key)
    }
}

#[async_trait]
impl KeyStore for KeyRepository {
    async fn select_key(&self, excluded: &[String]) -> AppResult<Option<SynthesisKey>> {
        // Same ordering as domain::tts::key_pool::pick_least_used.
        let key = sqlx::query_as::<_, SynthesisKey>(
            r#"
            SELECT id, name, secret, used_characters, character_limit, enabled, tier,
                   last_used_at, last_checked_at, notes, created_at, updated_at
            FROM synthesis_keys
            WHERE enabled = TRUE
              AND used_characters < character_limit
              AND name <> ALL($1)
            ORDER BY used_characters ASC, last_used_at ASC NULLS FIRST, name ASC
            LIMIT 1
            "#,
        )
        .bind(excluded)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(key)
    }

    async fn record_usage(&self, key_name: &str, characters: i32) -> AppResult<()> {
        // Single-statement increment; safe under concurrent workers.
        sqlx::query(
            r#"
            UPDATE synthesis_keys
            SET used_characters = used_characters + $2,
                last_used_at = $3,
                updated_at = $3
            WHERE name = $1
            "#,
        )
        .bind(key_name)
        .bind(characters)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn touch_checked(&self, key_name: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE synthesis_keys
            SET last_checked_at = $2,
                updated_at = $2
            WHERE name = $1
            "#,
        )
        .bind(key_name)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
