use crate::domain::tts::model::SynthesisKey;
use crate::infrastructure::repositories::KeyStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-job view over the shared key pool.
///
/// Tracks which keys this run has already been handed so a key that fails
/// is never tried twice within the same job, independent of what other
/// concurrent jobs are doing. Selection itself happens at the store so the
/// usage counters stay authoritative across workers.
pub struct KeyPool {
    keys: Arc<dyn KeyStore>,
    tried: HashSet<String>,
}

impl KeyPool {
    pub fn new(keys: Arc<dyn KeyStore>) -> Self {
        Self {
            keys,
            tried: HashSet::new(),
        }
    }

    /// Select the least-used enabled key not yet tried by this run.
    /// Returns `None` once every usable key has been handed out.
    pub async fn select_key(&mut self) -> Result<Option<SynthesisKey>, crate::error::AppError> {
        let excluded: Vec<String> = self.tried.iter().cloned().collect();
        let key = self.keys.select_key(&excluded).await?;
        if let Some(key) = &key {
            self.tried.insert(key.name.clone());
        }
        Ok(key)
    }

    /// Charge a successful synthesis to a key. Best-effort: a failed counter
    /// update is logged but does not fail the job that already has its audio.
    pub async fn record_usage(&self, key_name: &str, characters: i32) {
        if let Err(err) = self.keys.record_usage(key_name, characters).await {
            tracing::error!(
                key = key_name,
                characters = characters,
                error = %err,
                "Failed to record key usage"
            );
        }
    }

    /// Note a key failure for observability. The key stays excluded for this
    /// run via the tried set; pool-wide state is untouched.
    pub async fn mark_unavailable(&self, key_name: &str, reason: &str) {
        tracing::warn!(key = key_name, reason = reason, "Key marked unavailable for this run");
        if let Err(err) = self.keys.touch_checked(key_name).await {
            tracing::debug!(key = key_name, error = %err, "Failed to stamp key check time");
        }
    }

    pub fn tried_count(&self) -> usize {
        self.tried.len()
    }
}

/// Least-used selection policy: lowest `used_characters` wins, ties broken
/// by oldest `last_used_at` (never-used keys first), then by name so the
/// order is deterministic. Disabled and over-limit keys never qualify.
///
/// The Postgres store mirrors this exact ordering in SQL; in-memory stores
/// (tests) call this directly.
pub fn pick_least_used<'a>(
    keys: impl IntoIterator<Item = &'a SynthesisKey>,
    excluded: &HashSet<String>,
) -> Option<&'a SynthesisKey> {
    keys.into_iter()
        .filter(|k| k.is_selectable() && !excluded.contains(&k.name))
        .min_by(|a, b| {
            a.used_characters
                .cmp(&b.used_characters)
                .then_with(|| match (a.last_used_at, b.last_used_at) {
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (Some(x), Some(y)) => x.cmp(&y),
                })
                .then_with(|| a.name.cmp(&b.name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tts::model::KeyTier;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn key(name: &str, used: i32, enabled: bool) -> SynthesisKey {
        SynthesisKey {
            id: Uuid::new_v4(),
            name: name.to_string(),
            secret: "secret".to_string(),
            used_characters: used,
            character_limit: 10000,
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
    fn test_picks_minimum_used_characters() {
        let keys = vec![key("a", 500, true), key("b", 0, true), key("c", 9000, true)];
        let picked = pick_least_used(&keys, &HashSet::new()).unwrap();
        assert_eq!(picked.name, "b");
    }

    #[test]
    fn test_never_picks_disabled_keys() {
        let keys = vec![key("a", 0, false), key("b", 500, true)];
        let picked = pick_least_used(&keys, &HashSet::new()).unwrap();
        assert_eq!(picked.name, "b");

        let all_disabled = vec![key("a", 0, false), key("b", 0, false)];
        assert!(pick_least_used(&all_disabled, &HashSet::new()).is_none());
    }

    #[test]
    fn test_never_picks_over_limit_keys() {
        let mut exhausted = key("a", 10000, true);
        exhausted.character_limit = 10000;
        let keys = vec![exhausted, key("b", 9999, true)];
        let picked = pick_least_used(&keys, &HashSet::new()).unwrap();
        assert_eq!(picked.name, "b");
    }

    #[test]
    fn test_excluded_keys_are_skipped() {
        let keys = vec![key("a", 0, true), key("b", 500, true)];
        let excluded: HashSet<String> = ["a".to_string()].into_iter().collect();
        let picked = pick_least_used(&keys, &excluded).unwrap();
        assert_eq!(picked.name, "b");
    }

    #[test]
    fn test_tie_broken_by_oldest_last_used_then_name() {
        let now = Utc::now();
        let mut a = key("a", 100, true);
        a.last_used_at = Some(now);
        let mut b = key("b", 100, true);
        b.last_used_at = Some(now - Duration::hours(1));
        let picked = pick_least_used(vec![&a, &b], &HashSet::new()).unwrap();
        assert_eq!(picked.name, "b");

        // Never-used beats any timestamp
        let c = key("c", 100, true);
        let picked = pick_least_used(vec![&a, &b, &c], &HashSet::new()).unwrap();
        assert_eq!(picked.name, "c");

        // Identical state falls back to name order
        let d = key("d", 100, true);
        let e = key("e", 100, true);
        let picked = pick_least_used(vec![&e, &d], &HashSet::new()).unwrap();
        assert_eq!(picked.name, "d");
    }
}
