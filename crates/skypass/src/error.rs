//! Error types for boarding pass issuing operations.
//!
//! This module defines the [`enum@Error`] enum covering all failure cases:
//! key lifecycle I/O, credential loading, configuration, and pass artifact
//! generation.
//!
//! Cryptographic checks (hash comparison, signature verification) never
//! surface here — they return booleans or options at the signature engine
//! boundary so callers can treat "cannot sign" and "does not verify" as
//! ordinary states rather than faults.

use thiserror::Error;

/// Error type for skypass operations.
///
/// All fallible public functions in this crate return [`crate::Result<T>`],
/// which uses this error type.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Occurs when persisting freshly generated key pairs, reading
    /// certificates or images, or writing pass artifacts. A failure while
    /// persisting a new key pair is fatal: a usable signing identity cannot
    /// exist without its on-disk keys.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Signing identity key material could not be produced.
    ///
    /// Covers RSA key generation and PEM serialization failures during
    /// first-time identity creation. Unreadable existing key files do *not*
    /// produce this error; they degrade the identity instead.
    #[error("Key error: {0}")]
    Key(String),

    /// Invalid or malformed pass-signing certificate or private key.
    ///
    /// The certificate/key material handed to the exporter could not be
    /// parsed, or the PKCS#12 container is malformed.
    #[error("Invalid certificate: {0}")]
    Certificate(String),

    /// Incorrect password for a PKCS#12 container.
    #[error("Invalid password for PKCS#12")]
    InvalidPassword,

    /// Required signing credentials not configured.
    ///
    /// Pass export was attempted without configuring either a PKCS#12
    /// container or a certificate/key pair.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid issuer or exporter configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization of a pass document or barcode payload failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive operation failed while bundling a pass.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Pass artifact generation failed.
    ///
    /// The packaging step rejected the bundle (bad certificate chain,
    /// unreadable image, CMS signing failure). No partial artifact is ever
    /// produced; this error is distinct from not-found and authentication
    /// failures so callers can report it as such.
    #[error("Pass generation failed: {0}")]
    PassGeneration(String),
}
