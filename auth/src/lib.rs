//! Authentication core for the Chatop API.
//!
//! Stateless token authentication:
//! - RSA key pair loaded once from a PKCS#12 key store
//! - Password hashing (Argon2id, tunable cost)
//! - RS256 token issuance and validation with an explicit `now`
//! - A framework-free authentication gate deciding, per request, whether the
//!   caller may proceed and as whom
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Route Classification
//! ```
//! use auth::gate::RouteClass;
//! use auth::RouteTable;
//!
//! let routes = RouteTable::new()
//!     .permit("/api/auth/login")
//!     .permit("/api/rentals/image/**");
//!
//! assert_eq!(routes.classify("/api/rentals/image/1.png"), RouteClass::Public);
//! assert_eq!(routes.classify("/api/messages"), RouteClass::Protected);
//! ```

pub mod authenticator;
pub mod gate;
pub mod identity;
pub mod jwt;
pub mod keystore;
pub mod password;

#[cfg(test)]
mod testutil;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::TokenSettings;
pub use gate::AuthenticationGate;
pub use gate::GateRequest;
pub use gate::RouteTable;
pub use identity::AuthResult;
pub use identity::FailureKind;
pub use identity::Identity;
pub use identity::Principal;
pub use identity::USER_AUTHORITY;
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenValidator;
pub use keystore::KeyPair;
pub use keystore::KeyStoreConfig;
pub use keystore::KeyStoreError;
pub use password::PasswordCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
