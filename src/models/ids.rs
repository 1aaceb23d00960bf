//! Deterministic match IDs from a SHA256 content hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Short hex digest identifying a saved match.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Hash `fields` joined by `|` and keep the first 16 hex characters.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let digest = hex::encode(hasher.finalize());
        Self(digest[..16].to_string())
    }

    /// The lobby's names in sorted order plus the creation time, so the same
    /// ten players at the same instant always hash alike.
    pub fn for_match(names: &[&str], created_at: &str) -> Self {
        let mut fields: Vec<&str> = names.to_vec();
        fields.sort_unstable();
        fields.push(created_at);
        Self::generate(&fields)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = MatchId::generate(&["alpha#NA1", "2025-03-01T10:00:00Z"]);
        let b = MatchId::generate(&["alpha#NA1", "2025-03-01T10:00:00Z"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, MatchId::generate(&["beta#NA1", "2025-03-01T10:00:00Z"]));
    }

    #[test]
    fn test_for_match_ignores_name_order() {
        let a = MatchId::for_match(&["b#1", "a#1", "c#1"], "2025-03-01T10:00:00Z");
        let b = MatchId::for_match(&["c#1", "b#1", "a#1"], "2025-03-01T10:00:00Z");
        let c = MatchId::for_match(&["c#1", "b#1", "a#1"], "2025-03-02T10:00:00Z");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = MatchId::generate(&["test"]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: MatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(format!("{:?}", id).starts_with("MatchId("));
    }
}
