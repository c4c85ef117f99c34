pub mod errors;
pub mod pkcs12;

pub use errors::KeyStoreError;
pub use pkcs12::KeyPair;
pub use pkcs12::KeyStoreConfig;
