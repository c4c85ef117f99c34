use std::collections::BTreeSet;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::TokenError;

/// Signs RS256 access tokens.
///
/// Owns the private key. Issuance is a pure function of its inputs and the
/// configured lifetime; it never reads the wall clock or touches storage.
pub struct TokenIssuer {
    signing_key: EncodingKey,
    lifetime_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer.
    ///
    /// # Arguments
    /// * `signing_key` - RSA private key
    /// * `lifetime` - Validity window of every issued token
    ///
    /// # Errors
    /// * `InvalidLifetime` - Lifetime is shorter than one second
    pub fn new(signing_key: EncodingKey, lifetime: Duration) -> Result<Self, TokenError> {
        let lifetime_secs =
            i64::try_from(lifetime.as_secs()).map_err(|_| TokenError::InvalidLifetime)?;
        if lifetime_secs < 1 {
            return Err(TokenError::InvalidLifetime);
        }

        Ok(Self {
            signing_key,
            lifetime_secs,
        })
    }

    /// Issue a token for `subject` valid from `now` until `now + lifetime`.
    ///
    /// # Returns
    /// Compact `header.claims.signature` encoding, each part base64url
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry overflows or signing failed
    pub fn issue(
        &self,
        subject: &str,
        authorities: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.lifetime_secs)
            .ok_or_else(|| TokenError::EncodingFailed("expiry overflows".to_string()))?;

        let claims = Claims::new(subject, iat, exp).with_authorities(authorities.clone());

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    use super::*;
    use crate::testutil;

    fn decode_part(part: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(part).expect("Invalid base64url");
        serde_json::from_slice(&bytes).expect("Invalid JSON")
    }

    #[test]
    fn test_issue_compact_encoding() {
        let issuer = testutil::issuer(Duration::from_secs(3600));
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let token = issuer
            .issue("a@test.com", &testutil::user_authorities(), now)
            .expect("Failed to issue token");

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header = decode_part(parts[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["typ"], "JWT");

        let claims = decode_part(parts[1]);
        assert_eq!(claims["sub"], "a@test.com");
        assert_eq!(claims["iat"], 1_700_000_000);
        assert_eq!(claims["exp"], 1_700_003_600);
        assert_eq!(claims["authorities"], serde_json::json!(["USER"]));
    }

    #[test]
    fn test_issue_is_deterministic_for_fixed_now() {
        let issuer = testutil::issuer(Duration::from_secs(60));
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let authorities = testutil::user_authorities();

        let first = issuer.issue("a@test.com", &authorities, now).unwrap();
        let second = issuer.issue("a@test.com", &authorities, now).unwrap();

        // PKCS#1 v1.5 signatures are deterministic.
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_rejects_sub_second_lifetime() {
        let (signing_key, _) = testutil::key_pair().into_parts();

        let result = TokenIssuer::new(signing_key, Duration::from_millis(500));
        assert!(matches!(result, Err(TokenError::InvalidLifetime)));
    }

    #[test]
    fn test_issue_overflowing_expiry() {
        let (signing_key, _) = testutil::key_pair().into_parts();
        let issuer = TokenIssuer::new(signing_key, Duration::from_secs(u64::MAX / 2))
            .expect("Failed to build issuer");
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let result = issuer.issue("a@test.com", &BTreeSet::new(), now);
        assert!(matches!(result, Err(TokenError::EncodingFailed(_))));
    }
}
