use std::collections::BTreeSet;
use std::time::Duration;

use crate::jwt::TokenIssuer;
use crate::keystore::KeyPair;

const KEYSTORE: &[u8] = include_bytes!("../tests/fixtures/keystore.p12");
const OTHER_KEYSTORE: &[u8] = include_bytes!("../tests/fixtures/other-keystore.p12");

pub fn key_pair() -> KeyPair {
    KeyPair::from_pkcs12(KEYSTORE, "changeit", "chatop", "changeit")
        .expect("Failed to load test key store")
}

pub fn other_key_pair() -> KeyPair {
    KeyPair::from_pkcs12(OTHER_KEYSTORE, "changeit", "chatop", "changeit")
        .expect("Failed to load second test key store")
}

pub fn issuer(lifetime: Duration) -> TokenIssuer {
    let (signing_key, _) = key_pair().into_parts();
    TokenIssuer::new(signing_key, lifetime).expect("Failed to build issuer")
}

pub fn user_authorities() -> BTreeSet<String> {
    BTreeSet::from(["USER".to_string()])
}
