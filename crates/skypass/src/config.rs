//! Issuer configuration.
//!
//! Mirrors the deployment surface of the hosting service: where identity
//! keys live, the shared server secret, the Apple pass-signing certificate,
//! and the image assets bundled into every pass. Values come from
//! `SKYPASS_*` environment variables or are set directly on the struct.

use std::path::PathBuf;

/// Configuration for a [`crate::PassIssuer`].
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Directory holding per-identity `{name}.pem` / `{name}.pub` key files.
    pub keys_dir: PathBuf,
    /// Shared server secret mixed into every digest hash.
    pub secret: String,
    /// Whether digests carry an RSA signature in addition to the secret hash.
    pub use_public_key_signature: bool,
    /// Pass-signing certificate: a PEM certificate or a `.p12` container.
    pub certificate_path: PathBuf,
    /// Password for the PKCS#12 container, if any.
    pub certificate_password: String,
    /// Directory with `icon.png`, `icon@2x.png` and `logo.png` pass images.
    pub images_dir: PathBuf,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            keys_dir: PathBuf::from("keys"),
            secret: String::new(),
            use_public_key_signature: true,
            certificate_path: PathBuf::from("certs/certificate.pem"),
            certificate_password: String::new(),
            images_dir: PathBuf::from("images"),
        }
    }
}

impl IssuerConfig {
    /// Build a configuration from `SKYPASS_*` environment variables.
    ///
    /// Unset variables keep their defaults. Recognized variables:
    /// `SKYPASS_KEYS_DIR`, `SKYPASS_SECRET`, `SKYPASS_USE_PUBLIC_KEY_SIGNATURE`,
    /// `SKYPASS_CERTIFICATE_PATH`, `SKYPASS_CERTIFICATE_PASSWORD`,
    /// `SKYPASS_IMAGES_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("SKYPASS_KEYS_DIR") {
            config.keys_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SKYPASS_SECRET") {
            config.secret = v;
        }
        if let Ok(v) = std::env::var("SKYPASS_USE_PUBLIC_KEY_SIGNATURE") {
            config.use_public_key_signature = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("SKYPASS_CERTIFICATE_PATH") {
            config.certificate_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SKYPASS_CERTIFICATE_PASSWORD") {
            config.certificate_password = v;
        }
        if let Ok(v) = std::env::var("SKYPASS_IMAGES_DIR") {
            config.images_dir = PathBuf::from(v);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IssuerConfig::default();
        assert_eq!(config.keys_dir, PathBuf::from("keys"));
        assert!(config.use_public_key_signature);
        assert!(config.secret.is_empty());
    }
}
