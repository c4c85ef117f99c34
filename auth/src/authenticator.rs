use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::identity::FailureKind;
use crate::identity::Identity;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenValidator;
use crate::keystore::KeyPair;
use crate::password::PasswordCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

// Verified against when the account does not exist, so unknown emails cost
// the same as wrong passwords.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "unknown-account-placeholder";

/// Token lifetime and clock-skew tolerance.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub lifetime: Duration,
    pub leeway: Duration,
}

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: Arc<TokenValidator>,
    unknown_account_hash: String,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `key_pair` - RSA key pair loaded from the key store
    /// * `settings` - Token lifetime and leeway
    /// * `cost` - Argon2 cost for new password hashes
    ///
    /// # Errors
    /// * `PasswordError` - Cost is invalid
    /// * `TokenError` - Lifetime is invalid
    pub fn new(
        key_pair: KeyPair,
        settings: TokenSettings,
        cost: PasswordCost,
    ) -> Result<Self, AuthenticationError> {
        let (signing_key, verifying_key) = key_pair.into_parts();
        let issuer = TokenIssuer::new(signing_key, settings.lifetime)?;
        let password_hasher = PasswordHasher::with_cost(cost)?;
        let unknown_account_hash = password_hasher.hash(UNKNOWN_ACCOUNT_PASSWORD)?;

        Ok(Self {
            password_hasher,
            issuer,
            validator: Arc::new(TokenValidator::new(verifying_key, settings.leeway)),
            unknown_account_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Token subject
    /// * `authorities` - Authorities to grant
    /// * `now` - Issue time
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unreadable
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        authorities: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issuer.issue(subject, authorities, now)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Spend one password verification and fail, for logins naming no account.
    pub fn reject_unknown_account(&self, password: &str) -> AuthenticationError {
        let _ = self
            .password_hasher
            .verify(password, &self.unknown_account_hash);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, where the credential was just created.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn generate_token(
        &self,
        subject: &str,
        authorities: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issuer.issue(subject, authorities, now)
    }

    /// Validate a token as of `now`.
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, FailureKind> {
        self.validator.validate(token, now)
    }

    /// Shared handle on the validator, for the authentication gate.
    pub fn validator(&self) -> Arc<TokenValidator> {
        Arc::clone(&self.validator)
    }
}
