use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::KeyPair;
use auth::PasswordCost;
use auth::TokenSettings;
use auth::USER_AUTHORITY;
use chrono::DateTime;
use chrono::Utc;

/// Authenticator over the shared fixture key store, with a cheap hash cost.
pub fn authenticator() -> Arc<Authenticator> {
    let key_pair = KeyPair::from_pkcs12(
        include_bytes!("../../../auth/tests/fixtures/keystore.p12"),
        "changeit",
        "chatop",
        "changeit",
    )
    .expect("Failed to load fixture key store");

    let authenticator = Authenticator::new(
        key_pair,
        TokenSettings {
            lifetime: Duration::from_secs(3600),
            leeway: Duration::from_secs(60),
        },
        PasswordCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    )
    .expect("Failed to build authenticator");

    Arc::new(authenticator)
}

/// One-hour token for `subject`, issued at `now`.
pub fn token_for(subject: &str, now: DateTime<Utc>) -> String {
    authenticator()
        .generate_token(
            subject,
            &BTreeSet::from([USER_AUTHORITY.to_string()]),
            now,
        )
        .expect("Failed to issue token")
}
