//! # Clear Key
//!
//! Shared secret gating `DELETE /api/analytics/clear`.
//!
//! A deployment either configures a key or runs on the built-in local key.
//! The two are distinct variants so the insecure fallback is never mistaken
//! for a configured secret.

use std::fmt;

use subtle::ConstantTimeEq;

/// Header carrying the clear key
pub const CLEAR_KEY_HEADER: &str = "x-clear-key";

/// Well-known key used when nothing is configured; for local runs only
pub const INSECURE_LOCAL_CLEAR_KEY: &str = "ragindex-secret-clear-2026";

/// The secret the clear endpoint compares against
#[derive(Clone, PartialEq, Eq)]
pub enum ClearKey {
    /// Key supplied by configuration (file or environment)
    Configured(String),
    /// Nothing configured; [`INSECURE_LOCAL_CLEAR_KEY`] applies
    InsecureLocalDefault,
}

impl ClearKey {
    /// A configured key if one is present, the insecure default otherwise
    pub fn from_configured(key: Option<String>) -> Self {
        match key {
            Some(key) => ClearKey::Configured(key),
            None => ClearKey::InsecureLocalDefault,
        }
    }

    /// The secret value in effect
    pub fn secret(&self) -> &str {
        match self {
            ClearKey::Configured(key) => key,
            ClearKey::InsecureLocalDefault => INSECURE_LOCAL_CLEAR_KEY,
        }
    }

    pub fn is_insecure_default(&self) -> bool {
        matches!(self, ClearKey::InsecureLocalDefault)
    }

    /// Exact, constant-time comparison; a missing header never matches
    pub fn matches(&self, presented: Option<&[u8]>) -> bool {
        match presented {
            Some(value) => bool::from(value.ct_eq(self.secret().as_bytes())),
            None => false,
        }
    }
}

impl Default for ClearKey {
    fn default() -> Self {
        ClearKey::InsecureLocalDefault
    }
}

impl fmt::Debug for ClearKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearKey::Configured(_) => write!(f, "ClearKey::Configured(<redacted>)"),
            ClearKey::InsecureLocalDefault => write!(f, "ClearKey::InsecureLocalDefault"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_falls_back_to_local_key() {
        let key = ClearKey::from_configured(None);
        assert!(key.is_insecure_default());
        assert!(key.matches(Some(b"ragindex-secret-clear-2026")));
    }

    #[test]
    fn test_configured_key_replaces_local_key() {
        let key = ClearKey::from_configured(Some("prod-secret".to_string()));
        assert!(!key.is_insecure_default());
        assert!(key.matches(Some(b"prod-secret")));
        assert!(!key.matches(Some(INSECURE_LOCAL_CLEAR_KEY.as_bytes())));
    }

    #[test]
    fn test_mismatches() {
        let key = ClearKey::Configured("prod-secret".to_string());
        assert!(!key.matches(None));
        assert!(!key.matches(Some(b"")));
        assert!(!key.matches(Some(b"prod-secre")));
        assert!(!key.matches(Some(b"PROD-SECRET")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key = ClearKey::Configured("prod-secret".to_string());
        let debug = format!("{:?}", key);
        assert!(!debug.contains("prod-secret"));
        assert!(debug.contains("redacted"));
    }
}
