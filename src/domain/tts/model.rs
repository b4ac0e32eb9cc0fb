use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A synthesis-provider API key with its quota accounting state.
///
/// Keys are created by an admin and shared by all jobs; `used_characters`
/// is only ever moved forward with an atomic increment at the persistence
/// layer, so concurrent workers cannot lose an update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SynthesisKey {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub used_characters: i32,
    pub character_limit: i32,
    pub enabled: bool,
    pub tier: KeyTier,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SynthesisKey {
    /// A key is selectable when it is enabled and still has quota left.
    pub fn is_selectable(&self) -> bool {
        self.enabled && self.used_characters < self.character_limit
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeyTier {
    Free,
    Pro,
    Team,
}

impl std::fmt::Display for KeyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyTier::Free => write!(f, "free"),
            KeyTier::Pro => write!(f, "pro"),
            KeyTier::Team => write!(f, "team"),
        }
    }
}

impl std::str::FromStr for KeyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(KeyTier::Free),
            "pro" => Ok(KeyTier::Pro),
            "team" => Ok(KeyTier::Team),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Terminal record of one synthesis job. Written exactly once, never
/// mutated afterwards; status polling reads these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TtsJobRecord {
    pub id: Uuid,
    pub job_id: String,
    pub input_text: String,
    pub voice_id: String,
    pub audio_url: Option<String>,
    pub key_name: Option<String>,
    pub characters_used: i32,
    pub duration_ms: i64,
    pub status: JobStatus,
    pub error: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Success => write!(f, "success"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Values for a new terminal job record.
#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub job_id: String,
    pub input_text: String,
    pub voice_id: String,
    pub audio_url: Option<String>,
    pub key_name: Option<String>,
    pub characters_used: i32,
    pub duration_ms: i64,
    pub status: JobStatus,
    pub error: Option<String>,
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(enabled: bool, used: i32, limit: i32) -> SynthesisKey {
        SynthesisKey {
            id: Uuid::new_v4(),
            name: "k".to_string(),
            secret: "s".to_string(),
            used_characters: used,
            character_limit: limit,
            enabled,
            tier: KeyTier::Free,
            last_used_at: None,
            last_checked_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_disabled_key_is_not_selectable() {
        assert!(!key(false, 0, 10000).is_selectable());
    }

    #[test]
    fn test_key_at_limit_is_not_selectable() {
        assert!(!key(true, 10000, 10000).is_selectable());
        assert!(key(true, 9999, 10000).is_selectable());
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in [KeyTier::Free, KeyTier::Pro, KeyTier::Team] {
            assert_eq!(tier.to_string().parse::<KeyTier>(), Ok(tier));
        }
        assert!("enterprise".parse::<KeyTier>().is_err());
    }
}
