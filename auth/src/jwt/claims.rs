use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::identity::Identity;

/// Claims carried by an access token.
///
/// `sub`, `iat` and `exp` are required: a token missing any of them does not
/// deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Granted authorities
    #[serde(default)]
    pub authorities: BTreeSet<String>,
}

impl Claims {
    pub fn new(sub: impl ToString, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.to_string(),
            iat,
            exp,
            authorities: BTreeSet::new(),
        }
    }

    /// Set authorities.
    pub fn with_authorities(mut self, authorities: BTreeSet<String>) -> Self {
        self.authorities = authorities;
        self
    }

    /// Check if token is expired. A token is still valid at exactly `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Check if the token claims to be issued later than `current_timestamp + leeway`.
    pub fn is_issued_in_future(&self, current_timestamp: i64, leeway_secs: i64) -> bool {
        self.iat > current_timestamp.saturating_add(leeway_secs)
    }

    pub fn into_identity(self) -> Identity {
        Identity::new(self.sub, self.authorities)
    }
}
