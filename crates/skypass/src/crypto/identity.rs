//! RSA signing identities and their on-disk key store.
//!
//! Each signing identity (one per airline) owns an RSA-2048 key pair stored
//! as `{name}.pem` (PKCS#8 private key) and `{name}.pub`
//! (SubjectPublicKeyInfo public key) under the configured keys directory,
//! plus the deployment-wide shared secret.
//!
//! Absence of key material is a valid, checked state, not a fault: an
//! identity with no private key can hash but never sign, one with no public
//! key can hash but never verify signatures. Helpers therefore return
//! `Option`/`bool` instead of errors; only first-time key creation can fail.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest as _, Sha256};
use tracing::{debug, warn};

use crate::crypto::digest::SignatureDigest;
use crate::{Error, Result};

const RSA_BITS: usize = 2048;

/// One airline's signing identity: an optional RSA key pair plus the shared
/// server secret.
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    base_name: String,
    secret: String,
    use_public_key_signature: bool,
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
}

/// Exported public half of an identity, handed to clients that want to
/// verify signatures offline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PublicKeyExport {
    #[serde(rename = "baseName")]
    pub base_name: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

impl SigningIdentity {
    /// Build an identity from already-loaded key material. Intended for
    /// tests and for callers that manage keys themselves; production code
    /// goes through [`KeyStore`].
    pub fn with_keys(
        base_name: impl Into<String>,
        secret: impl Into<String>,
        use_public_key_signature: bool,
        private_key: Option<RsaPrivateKey>,
        public_key: Option<RsaPublicKey>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            secret: secret.into(),
            use_public_key_signature,
            private_key,
            public_key,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn can_verify(&self) -> bool {
        self.public_key.is_some()
    }

    /// SHA-256 hex digest of `secret || data`.
    ///
    /// This is a shared-secret watermark, not an HMAC: there is no domain
    /// separation, which is acceptable only because the secret is a
    /// deployment-wide constant rather than a per-message key.
    pub fn secret_hash(&self, data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check a bare secret hash against the given data.
    pub fn verify_secret_hash(&self, data: &str, hash: &str) -> bool {
        self.secret_hash(data) == hash
    }

    /// RSA-PKCS1v15 signature over SHA-256(data), base64-encoded.
    ///
    /// Returns `None` when no private key is loaded or signing fails;
    /// callers treat a missing signature as "unsigned", not as an error.
    pub fn sign(&self, data: &str) -> Option<String> {
        let private_key = self.private_key.as_ref()?;
        let signing_key = SigningKey::<Sha256>::new(private_key.clone());
        let signature = signing_key.try_sign(data.as_bytes()).ok()?;
        Some(BASE64.encode(signature.to_bytes()))
    }

    /// RSA-PKCS1v15/SHA-256 verification against the loaded public key.
    ///
    /// Returns `false` on malformed base64, an invalid signature, or a
    /// missing public key. Never fails.
    pub fn verify(&self, data: &str, signature: &str) -> bool {
        let Some(public_key) = self.public_key.as_ref() else {
            return false;
        };
        let Ok(raw) = BASE64.decode(signature) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return false;
        };
        let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
        verifying_key.verify(data.as_bytes(), &signature).is_ok()
    }

    /// Produce the digest envelope for a data string.
    ///
    /// The hash is always present; the signature only when public-key
    /// signatures are enabled and a private key is available.
    pub fn digest(&self, data: &str) -> SignatureDigest {
        let signature = if self.use_public_key_signature {
            self.sign(data)
        } else {
            None
        };
        SignatureDigest {
            hash: self.secret_hash(data),
            signature,
        }
    }

    /// Verify a digest envelope against the data it claims to cover.
    ///
    /// The hash must be present and match. A signature is checked only when
    /// present: a hash-only digest with a correct hash verifies. That
    /// fallback keeps passes issued by sign-incapable identities scannable
    /// and is deliberate — tightening it is a product decision, not a bug
    /// fix.
    pub fn verify_digest(&self, data: &str, digest: &SignatureDigest) -> bool {
        if digest.hash.is_empty() {
            return false;
        }
        if digest.hash != self.secret_hash(data) {
            return false;
        }
        match &digest.signature {
            Some(signature) => self.verify(data, signature),
            None => true,
        }
    }

    /// Export the identity's public half. The PEM is empty when no public
    /// key is loaded.
    pub fn export_public_key(&self) -> PublicKeyExport {
        let public_key = self
            .public_key
            .as_ref()
            .and_then(|key| key.to_public_key_pem(LineEnding::LF).ok())
            .unwrap_or_default();
        PublicKeyExport {
            base_name: self.base_name.clone(),
            public_key,
        }
    }
}

/// Keyed store of signing identities backed by a keys directory.
///
/// Explicitly injected into callers (no hidden global), so tests can
/// [`insert`](KeyStore::insert) in-memory identities without touching the
/// filesystem. Loaded identities are cached; key files are read-only after
/// creation, so cached entries never go stale.
pub struct KeyStore {
    keys_dir: PathBuf,
    secret: String,
    use_public_key_signature: bool,
    cache: RwLock<HashMap<String, Arc<SigningIdentity>>>,
}

impl KeyStore {
    pub fn new(
        keys_dir: impl Into<PathBuf>,
        secret: impl Into<String>,
        use_public_key_signature: bool,
    ) -> Self {
        Self {
            keys_dir: keys_dir.into(),
            secret: secret.into(),
            use_public_key_signature,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the identity for `name`, loading it from disk or creating and
    /// persisting a fresh key pair if its files are missing.
    ///
    /// Unreadable or unparsable key files degrade the identity (it keeps
    /// hashing but loses sign/verify capability); only first-creation
    /// failures are fatal.
    pub fn load_or_create(&self, name: &str) -> Result<Arc<SigningIdentity>> {
        validate_identity_name(name)?;
        if let Some(identity) = self.cache.read().expect("keystore lock").get(name) {
            return Ok(Arc::clone(identity));
        }

        let identity = if self.private_key_path(name).exists() && self.public_key_path(name).exists()
        {
            self.load(name)
        } else {
            self.create(Some(name))?
        };
        Ok(self.store(identity))
    }

    /// Create a new anonymous identity named by the SHA-1 hex digest of its
    /// serialized public key, guaranteeing a stable content-derived name.
    pub fn create_anonymous(&self) -> Result<Arc<SigningIdentity>> {
        let identity = self.create(None)?;
        Ok(self.store(identity))
    }

    /// Register a pre-built identity, bypassing the filesystem. Returns the
    /// cached handle.
    pub fn insert(&self, identity: SigningIdentity) -> Arc<SigningIdentity> {
        self.store(identity)
    }

    fn store(&self, identity: SigningIdentity) -> Arc<SigningIdentity> {
        let identity = Arc::new(identity);
        self.cache
            .write()
            .expect("keystore lock")
            .insert(identity.base_name().to_string(), Arc::clone(&identity));
        identity
    }

    fn private_key_path(&self, name: &str) -> PathBuf {
        self.keys_dir.join(format!("{name}.pem"))
    }

    fn public_key_path(&self, name: &str) -> PathBuf {
        self.keys_dir.join(format!("{name}.pub"))
    }

    fn load(&self, name: &str) -> SigningIdentity {
        let private_key = match fs::read_to_string(self.private_key_path(name)) {
            Ok(pem) => match RsaPrivateKey::from_pkcs8_pem(&pem) {
                Ok(key) => Some(key),
                Err(err) => {
                    warn!(identity = name, %err, "unreadable private key, identity cannot sign");
                    None
                }
            },
            Err(_) => None,
        };
        let public_key = match fs::read_to_string(self.public_key_path(name)) {
            Ok(pem) => match RsaPublicKey::from_public_key_pem(&pem) {
                Ok(key) => Some(key),
                Err(err) => {
                    warn!(identity = name, %err, "unreadable public key, identity cannot verify");
                    None
                }
            },
            Err(_) => None,
        };
        SigningIdentity {
            base_name: name.to_string(),
            secret: self.secret.clone(),
            use_public_key_signature: self.use_public_key_signature,
            private_key,
            public_key,
        }
    }

    fn create(&self, name: Option<&str>) -> Result<SigningIdentity> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, RSA_BITS)
            .map_err(|e| Error::Key(format!("RSA key generation failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("Failed to serialize private key: {e}")))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::Key(format!("Failed to serialize public key: {e}")))?;

        let base_name = match name {
            Some(name) => name.to_string(),
            None => hex::encode(Sha1::digest(public_pem.as_bytes())),
        };

        fs::create_dir_all(&self.keys_dir)?;
        let private_path = self.private_key_path(&base_name);
        match write_new(&private_path, private_pem.as_bytes()) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                // Lost a concurrent first-creation race; the winner's key
                // pair is authoritative.
                debug!(identity = %base_name, "key pair already created concurrently, loading");
                return Ok(self.load(&base_name));
            }
            Err(err) => return Err(err.into()),
        }
        fs::write(self.public_key_path(&base_name), public_pem.as_bytes())?;
        debug!(identity = %base_name, "created signing identity");

        Ok(SigningIdentity {
            base_name,
            secret: self.secret.clone(),
            use_public_key_signature: self.use_public_key_signature,
            private_key: Some(private_key),
            public_key: Some(public_key),
        })
    }
}

/// Atomic create-if-absent write. Fails with `AlreadyExists` instead of
/// clobbering a concurrently created file.
fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(contents)
}

fn validate_identity_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("identity name must not be empty".into()));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::Config(format!(
            "identity name must not contain path separators: {name}"
        )));
    }
    Ok(())
}
