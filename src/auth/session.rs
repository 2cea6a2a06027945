//! Access-token session held by the identity gate

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The token type
    pub token_type: String,

    /// Space-separated scopes granted with the token, when the provider reports them
    pub scope: Option<String>,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

impl Session {
    /// Create a new session
    pub fn new(access_token: String, expires_in: Option<i64>, scope: Option<String>) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            scope,
            expires_at: expires_in.map(|secs| now_secs().saturating_add(secs)),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() >= expires_at,
            None => false,
        }
    }

    /// Scopes from `required` that the granted scope list does not include
    ///
    /// Returns nothing when the provider did not report granted scopes.
    pub fn missing_scopes<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        let Some(granted) = &self.scope else {
            return Vec::new();
        };
        let granted: Vec<&str> = granted.split_whitespace().collect();
        required
            .iter()
            .map(String::as_str)
            .filter(|scope| !granted.contains(scope))
            .collect()
    }
}
