use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::crypto;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::claims::Claims;
use crate::identity::FailureKind;
use crate::identity::Identity;

const EXPECTED_ALGORITHM: &str = "RS256";

#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
}

/// Verifies RS256 access tokens against the public key.
///
/// Checks run in a fixed order: shape, decoding, signature, expiry, issue
/// time. The signature is always checked, however plausible the claims look.
/// Holds no mutable state and performs no I/O.
pub struct TokenValidator {
    verifying_key: DecodingKey,
    leeway_secs: i64,
}

impl TokenValidator {
    /// Create a validator.
    ///
    /// # Arguments
    /// * `verifying_key` - RSA public key
    /// * `leeway` - Tolerated clock skew for the `iat` claim
    pub fn new(verifying_key: DecodingKey, leeway: Duration) -> Self {
        Self {
            verifying_key,
            leeway_secs: i64::try_from(leeway.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Validate `token` as of `now`.
    ///
    /// # Returns
    /// Identity asserted by the token
    ///
    /// # Errors
    /// * `Malformed` - Not three base64url segments, undecodable JSON, or
    ///   missing `sub`/`iat`/`exp`
    /// * `BadSignature` - Not signed with RS256 by the matching private key
    /// * `Expired` - `now` is past `exp`
    /// * `NotYetValid` - `iat` is further in the future than the leeway allows
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, FailureKind> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(FailureKind::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .ok_or(FailureKind::Malformed)?;
        if header.is_empty() || claims.is_empty() || signature.is_empty() || claims.contains('.')
        {
            return Err(FailureKind::Malformed);
        }

        let header: TokenHeader = decode_segment(header)?;
        let claims: Claims = decode_segment(claims)?;
        if claims.iat > claims.exp {
            return Err(FailureKind::Malformed);
        }

        if header.alg != EXPECTED_ALGORITHM {
            return Err(FailureKind::BadSignature);
        }
        let verified = crypto::verify(
            signature,
            signing_input.as_bytes(),
            &self.verifying_key,
            Algorithm::RS256,
        )
        .unwrap_or(false);
        if !verified {
            return Err(FailureKind::BadSignature);
        }

        let now = now.timestamp();
        if claims.is_expired(now) {
            return Err(FailureKind::Expired);
        }
        if claims.is_issued_in_future(now, self.leeway_secs) {
            return Err(FailureKind::NotYetValid);
        }

        Ok(claims.into_identity())
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, FailureKind> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| FailureKind::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| FailureKind::Malformed)
}
