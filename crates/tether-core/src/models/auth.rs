use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider credential bag attached to a connection, persisted as JSONB.
///
/// The known fields cover the OAuth refresh lifecycle; anything else the
/// provider returned on the original token exchange is carried through
/// untouched in `extra` so a refresh can round-trip the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// When the current access token was obtained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_acquired_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthData {
    /// Whether the access token has outlived its reported lifetime.
    ///
    /// Credentials without acquisition bookkeeping are treated as expired so
    /// the caller refreshes instead of failing downstream with a stale token.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.token_acquired_time, self.expires_in) {
            (Some(acquired), Some(expires_in)) => now > acquired + Duration::seconds(expires_in),
            _ => true,
        }
    }

    /// Overlay a provider token payload on top of these credentials.
    /// Keys present in `patch` replace existing values; everything else is kept.
    pub fn merged_with(&self, patch: &Map<String, Value>) -> Result<AuthData, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        if let Value::Object(ref mut fields) = base {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base)
    }
}

/// Verified identity extracted from a Google ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedUserInfo {
    pub email: String,
    pub email_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_data(acquired: Option<DateTime<Utc>>, expires_in: Option<i64>) -> AuthData {
        AuthData {
            access_token: Some("tok".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_in,
            token_acquired_time: acquired,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_expired_when_lifetime_elapsed() {
        let acquired = Utc::now() - Duration::seconds(7200);
        let data = auth_data(Some(acquired), Some(3600));
        assert!(data.is_expired(Utc::now()));
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let data = auth_data(Some(Utc::now()), Some(3600));
        assert!(!data.is_expired(Utc::now()));
    }

    #[test]
    fn test_missing_bookkeeping_counts_as_expired() {
        assert!(auth_data(None, Some(3600)).is_expired(Utc::now()));
        assert!(auth_data(Some(Utc::now()), None).is_expired(Utc::now()));
    }

    #[test]
    fn test_merge_replaces_and_preserves() {
        let data = auth_data(Some(Utc::now()), Some(3600));
        let patch = json!({
            "access_token": "new-tok",
            "scope": "repo"
        });
        let Value::Object(patch) = patch else {
            panic!("patch literal must be an object");
        };

        let merged = data.merged_with(&patch).unwrap();
        assert_eq!(merged.access_token.as_deref(), Some("new-tok"));
        assert_eq!(merged.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(merged.extra.get("scope"), Some(&json!("repo")));
    }

    #[test]
    fn test_unknown_provider_fields_round_trip() {
        let raw = json!({
            "access_token": "tok",
            "token_type": "bearer",
            "scope": ""
        });
        let data: AuthData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(data.extra.get("token_type"), Some(&json!("bearer")));
        assert_eq!(serde_json::to_value(&data).unwrap(), raw);
    }
}
