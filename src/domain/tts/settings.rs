use serde::{Deserialize, Serialize};

const DEFAULT_STABILITY: f64 = 0.3;
const DEFAULT_SIMILARITY_BOOST: f64 = 0.75;

/// Provider voice tunables sent with every synthesis call.
///
/// Unknown fields in an incoming payload are rejected rather than silently
/// dropped, so a typo in a client request fails loudly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceSettings {
    #[serde(default = "default_stability")]
    pub stability: f64,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f64,
}

fn default_stability() -> f64 {
    DEFAULT_STABILITY
}

fn default_similarity_boost() -> f64 {
    DEFAULT_SIMILARITY_BOOST
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: DEFAULT_STABILITY,
            similarity_boost: DEFAULT_SIMILARITY_BOOST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = VoiceSettings::default();
        assert_eq!(settings.stability, 0.3);
        assert_eq!(settings.similarity_boost, 0.75);
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let settings: VoiceSettings = serde_json::from_str(r#"{"stability": 0.5}"#).unwrap();
        assert_eq!(settings.stability, 0.5);
        assert_eq!(settings.similarity_boost, 0.75);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = serde_json::from_str::<VoiceSettings>(r#"{"stabilty": 0.5}"#);
        assert!(result.is_err());
    }
}
