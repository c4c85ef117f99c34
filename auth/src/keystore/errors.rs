use std::path::PathBuf;

use thiserror::Error;

/// Failure to load signing material at startup.
///
/// Every variant is fatal: the service must not start without a key pair.
#[derive(Debug, Clone, Error)]
pub enum KeyStoreError {
    #[error("Cannot read key store {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Key store is corrupt or the store password is wrong: {0}")]
    InvalidStore(String),

    #[error("No entry with alias '{0}' in key store")]
    AliasNotFound(String),

    #[error("Entry '{0}' does not hold a private key")]
    NotAPrivateKey(String),

    #[error("Key password rejected for entry '{0}'")]
    KeyPasswordRejected(String),

    #[error("Unsupported key type, expected an RSA private key: {0}")]
    UnsupportedKeyType(String),

    #[error("Failed to encode key material: {0}")]
    Encoding(String),
}
