pub mod credentials;
pub mod digest;
pub mod identity;

pub use credentials::PassCredentials;
pub use digest::{BarcodePayload, SignatureDigest};
pub use identity::{KeyStore, SigningIdentity};
