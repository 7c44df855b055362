//! Pass-signing certificate and private key handling.
//!
//! The exported `.pkpass` bundle is sealed with an Apple-issued pass type
//! certificate, which is distinct from the per-airline digest identities in
//! [`crate::crypto::identity`]. Credentials load from PEM files or a
//! password-protected PKCS#12 container.

use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::RsaPrivateKey;
use x509_certificate::CapturedX509Certificate;

use crate::{Error, Result};

/// Certificate, private key, and intermediate chain used to seal pass
/// bundles.
///
/// The private key is held as PKCS#8 DER so it can feed the CMS signer
/// directly. Treat instances as sensitive; avoid logging them.
pub struct PassCredentials {
    /// The pass type certificate.
    pub certificate: CapturedX509Certificate,
    /// PKCS#8 DER encoding of the matching RSA private key.
    pub key_der: Vec<u8>,
    /// Intermediate CA certificates (typically the Apple WWDR CA).
    pub chain: Vec<CapturedX509Certificate>,
}

impl PassCredentials {
    /// Load credentials from PEM-encoded certificate and unencrypted PKCS#8
    /// private key.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let certificate = CapturedX509Certificate::from_pem(cert_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate PEM: {e}")))?;

        let key_str = std::str::from_utf8(key_pem)
            .map_err(|e| Error::Certificate(format!("Invalid UTF-8 in key PEM: {e}")))?;
        let private_key = RsaPrivateKey::from_pkcs8_pem(key_str)
            .map_err(|e| Error::Certificate(format!("Failed to parse private key: {e}")))?;
        let key_der = private_key
            .to_pkcs8_der()
            .map_err(|e| Error::Certificate(format!("Failed to re-encode private key: {e}")))?
            .as_bytes()
            .to_vec();

        Ok(Self {
            certificate,
            key_der,
            chain: Vec::new(),
        })
    }

    /// Load credentials from a PKCS#12 (.p12) container.
    ///
    /// The first certificate bag is taken as the signing certificate; any
    /// further certificates become the chain. A wrong password surfaces as
    /// [`Error::InvalidPassword`].
    pub fn from_p12(p12_data: &[u8], password: &str) -> Result<Self> {
        let pfx = p12::PFX::parse(p12_data)
            .map_err(|e| Error::Certificate(format!("Failed to parse PKCS#12: {e:?}")))?;

        if !pfx.verify_mac(password) {
            return Err(Error::InvalidPassword);
        }

        let keys = pfx
            .key_bags(password)
            .map_err(|e| Error::Certificate(format!("Failed to extract keys from PKCS#12: {e:?}")))?;
        let certs = pfx.cert_x509_bags(password).map_err(|e| {
            Error::Certificate(format!("Failed to extract certs from PKCS#12: {e:?}"))
        })?;

        if certs.is_empty() {
            return Err(Error::Certificate("No certificate in PKCS#12".into()));
        }
        if keys.is_empty() {
            return Err(Error::Certificate("No private key in PKCS#12".into()));
        }

        let certificate = CapturedX509Certificate::from_der(certs[0].clone())
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate DER: {e}")))?;

        let key_der = keys[0].clone();
        // Reject non-RSA keys up front rather than at packaging time.
        RsaPrivateKey::from_pkcs8_der(&key_der)
            .map_err(|e| Error::Certificate(format!("Private key is not PKCS#8 RSA: {e}")))?;

        let chain: Vec<CapturedX509Certificate> = certs
            .into_iter()
            .skip(1)
            .filter_map(|der| CapturedX509Certificate::from_der(der).ok())
            .collect();

        Ok(Self {
            certificate,
            key_der,
            chain,
        })
    }

    /// Attach an intermediate certificate (PEM) to the chain.
    pub fn with_chain_certificate(mut self, cert_pem: &[u8]) -> Result<Self> {
        let cert = CapturedX509Certificate::from_pem(cert_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse chain certificate: {e}")))?;
        self.chain.push(cert);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pem_invalid_cert() {
        let result = PassCredentials::from_pem(b"not a cert", b"not a key");
        assert!(matches!(result, Err(Error::Certificate(_))));
    }

    #[test]
    fn test_from_p12_invalid_data() {
        let result = PassCredentials::from_p12(b"not valid p12 data", "password");
        assert!(matches!(result, Err(Error::Certificate(_))));
    }
}
