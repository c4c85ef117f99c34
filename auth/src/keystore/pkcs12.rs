use std::fmt;
use std::fs;
use std::path::PathBuf;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use p12_keystore::KeyStore;
use p12_keystore::KeyStoreEntry;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::Deserialize;

use super::errors::KeyStoreError;

/// Location and secrets of the PKCS#12 key store holding the signing key.
#[derive(Clone, Deserialize)]
pub struct KeyStoreConfig {
    pub path: PathBuf,
    pub store_password: String,
    pub key_alias: String,
    pub key_password: String,
}

impl fmt::Debug for KeyStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStoreConfig")
            .field("path", &self.path)
            .field("key_alias", &self.key_alias)
            .finish_non_exhaustive()
    }
}

/// RSA key pair loaded once at startup.
///
/// The signing half is handed to the token issuer, the verifying half to the
/// token validator. Neither is mutated after load, so both can be shared
/// across request handlers without synchronization.
pub struct KeyPair {
    private_key: EncodingKey,
    public_key: DecodingKey,
}

impl KeyPair {
    /// Read and unlock the key store described by `config`.
    ///
    /// # Errors
    /// * `Unreadable` - File is missing or cannot be read
    /// * any other `KeyStoreError` from [`KeyPair::from_pkcs12`]
    pub fn load(config: &KeyStoreConfig) -> Result<Self, KeyStoreError> {
        let data = fs::read(&config.path).map_err(|e| KeyStoreError::Unreadable {
            path: config.path.clone(),
            reason: e.to_string(),
        })?;

        let key_pair = Self::from_pkcs12(
            &data,
            &config.store_password,
            &config.key_alias,
            &config.key_password,
        )?;

        tracing::info!(
            path = %config.path.display(),
            alias = %config.key_alias,
            "Signing key pair loaded"
        );

        Ok(key_pair)
    }

    /// Extract the RSA key pair stored under `alias` in a PKCS#12 container.
    ///
    /// PKCS#12 protects the whole container with a single password, so the key
    /// password must match the store password.
    ///
    /// # Errors
    /// * `InvalidStore` - Data is not PKCS#12 or the store password is wrong
    /// * `AliasNotFound` - No entry named `alias`
    /// * `NotAPrivateKey` - Entry is a bare certificate or secret
    /// * `KeyPasswordRejected` - Key password does not unlock the entry
    /// * `UnsupportedKeyType` - Private key is not RSA
    pub fn from_pkcs12(
        data: &[u8],
        store_password: &str,
        alias: &str,
        key_password: &str,
    ) -> Result<Self, KeyStoreError> {
        let store = KeyStore::from_pkcs12(data, store_password)
            .map_err(|e| KeyStoreError::InvalidStore(e.to_string()))?;

        let chain = match store.entry(alias) {
            Some(KeyStoreEntry::PrivateKeyChain(chain)) => chain,
            Some(_) => return Err(KeyStoreError::NotAPrivateKey(alias.to_string())),
            None => return Err(KeyStoreError::AliasNotFound(alias.to_string())),
        };

        if key_password != store_password {
            return Err(KeyStoreError::KeyPasswordRejected(alias.to_string()));
        }

        Self::from_pkcs8_der(chain.key())
    }

    fn from_pkcs8_der(der: &[u8]) -> Result<Self, KeyStoreError> {
        let private_key = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| KeyStoreError::UnsupportedKeyType(e.to_string()))?;
        let public_key = private_key.to_public_key();

        let private_der = private_key
            .to_pkcs1_der()
            .map_err(|e| KeyStoreError::Encoding(e.to_string()))?;
        let public_der = public_key
            .to_pkcs1_der()
            .map_err(|e| KeyStoreError::Encoding(e.to_string()))?;

        Ok(Self {
            private_key: EncodingKey::from_rsa_der(private_der.as_bytes()),
            public_key: DecodingKey::from_rsa_der(public_der.as_bytes()),
        })
    }

    /// Signing key.
    pub fn private_key(&self) -> &EncodingKey {
        &self.private_key
    }

    /// Verification key.
    pub fn public_key(&self) -> &DecodingKey {
        &self.public_key
    }

    /// Split into the signing and verification halves.
    pub fn into_parts(self) -> (EncodingKey, DecodingKey) {
        (self.private_key, self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}
