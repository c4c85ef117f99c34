use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Authority granted to every registered user.
pub const USER_AUTHORITY: &str = "USER";

/// Authenticated caller: a subject (the account email) and its authorities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub authorities: BTreeSet<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, authorities: BTreeSet<String>) -> Self {
        Self {
            subject: subject.into(),
            authorities,
        }
    }

    /// Identity holding only the `USER` authority.
    pub fn user(subject: impl Into<String>) -> Self {
        Self::new(subject, BTreeSet::from([USER_AUTHORITY.to_string()]))
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// Who a request runs as once the gate lets it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Public route, no token inspected.
    Anonymous,
    User(Identity),
}

impl Principal {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Anonymous => None,
            Principal::User(identity) => Some(identity),
        }
    }
}

/// Reason a request was refused authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FailureKind {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed token")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token issued in the future")]
    NotYetValid,
}

impl FailureKind {
    /// Stable machine-readable code used in error payloads and logs.
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::MissingToken => "MISSING_TOKEN",
            FailureKind::Malformed => "MALFORMED_TOKEN",
            FailureKind::BadSignature => "BAD_SIGNATURE",
            FailureKind::Expired => "TOKEN_EXPIRED",
            FailureKind::NotYetValid => "TOKEN_NOT_YET_VALID",
        }
    }
}

/// Per-request authentication outcome. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Authenticated(Principal),
    Rejected(FailureKind),
}
