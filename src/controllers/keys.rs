use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::tts::{KeyTier, SynthesisKey},
    error::{AppError, AppResult},
    infrastructure::repositories::{KeyRepository, NewSynthesisKey},
};

const DEFAULT_CHARACTER_LIMIT: i32 = 10_000;

/// Request for POST /api/admin/keys
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Key as exposed to the admin console. The secret never leaves the server.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub name: String,
    pub used_characters: i32,
    pub character_limit: i32,
    pub enabled: bool,
    pub tier: KeyTier,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SynthesisKey> for KeyResponse {
    fn from(key: SynthesisKey) -> Self {
        Self {
            name: key.name,
            used_characters: key.used_characters,
            character_limit: key.character_limit,
            enabled: key.enabled,
            tier: key.tier,
            last_used_at: key.last_used_at,
            last_checked_at: key.last_checked_at,
            notes: key.notes,
            created_at: key.created_at,
        }
    }
}

pub struct KeysController {
    key_repo: Arc<KeyRepository>,
}

impl KeysController {
    pub fn new(key_repo: Arc<KeyRepository>) -> Self {
        Self { key_repo }
    }

    /// GET /api/admin/keys - List keys, newest first
    pub async fn list_keys(
        State(controller): State<Arc<KeysController>>,
    ) -> AppResult<Json<Vec<KeyResponse>>> {
        let keys = controller.key_repo.list().await?;
        Ok(Json(keys.into_iter().map(KeyResponse::from).collect()))
    }

    /// POST /api/admin/keys - Register a provider key
    pub async fn create_key(
        State(controller): State<Arc<KeysController>>,
        Json(request): Json<CreateKeyRequest>,
    ) -> AppResult<(StatusCode, Json<KeyResponse>)> {
        let new_key = validate_create_key(request)?;
        let key = controller.key_repo.create(new_key).await?;

        tracing::info!(key = %key.name, tier = %key.tier, "Synthesis key created");

        Ok((StatusCode::CREATED, Json(KeyResponse::from(key))))
    }
}

/// Validate a key payload, collecting every failing field rather than
/// stopping at the first one.
fn validate_create_key(request: CreateKeyRequest) -> Result<NewSynthesisKey, AppError> {
    let mut errors = Vec::new();

    let name = request.name.trim().to_string();
    if name.is_empty() {
        errors.push("name must not be empty".to_string());
    }

    let secret = request.key.trim().to_string();
    if secret.is_empty() {
        errors.push("key must not be empty".to_string());
    }

    let character_limit = request.character_limit.unwrap_or(DEFAULT_CHARACTER_LIMIT);
    if character_limit <= 0 {
        errors.push("characterLimit must be positive".to_string());
    }

    let tier = match request.tier.as_deref() {
        None => KeyTier::Free,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push("tier must be one of: free, pro, team".to_string());
            KeyTier::Free
        }),
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(NewSynthesisKey {
        name,
        secret,
        character_limit,
        tier,
        notes: request.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(name: &str, key: &str) -> CreateKeyRequest {
        CreateKeyRequest {
            name: name.to_string(),
            key: key.to_string(),
            character_limit: None,
            tier: None,
            notes: None,
        }
    }

    #[test]
    fn test_valid_payload_uses_defaults() {
        let new_key = validate_create_key(request("primary", "sk-123")).unwrap();
        assert_eq!(new_key.name, "primary");
        assert_eq!(new_key.character_limit, DEFAULT_CHARACTER_LIMIT);
        assert_eq!(new_key.tier, KeyTier::Free);
    }

    #[test]
    fn test_all_failing_fields_are_reported() {
        let mut bad = request("", "");
        bad.character_limit = Some(-5);
        bad.tier = Some("enterprise".to_string());

        match validate_create_key(bad) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().any(|e| e.contains("name")));
                assert!(errors.iter().any(|e| e.contains("key")));
                assert!(errors.iter().any(|e| e.contains("characterLimit")));
                assert!(errors.iter().any(|e| e.contains("tier")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_tier_is_parsed() {
        let mut req = request("primary", "sk-123");
        req.tier = Some("team".to_string());
        let new_key = validate_create_key(req).unwrap();
        assert_eq!(new_key.tier, KeyTier::Team);
    }

    #[test]
    fn test_whitespace_only_name_is_rejected() {
        let result = validate_create_key(request("   ", "sk-123"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
