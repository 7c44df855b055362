//! Pass artifact export.
//!
//! Flattens an assembled [`PassDocument`] into a packaging request
//! (serialized JSON + certificate material + image assets) and hands it to
//! the configured [`PassPackager`], returning the raw artifact bytes.

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::crypto::PassCredentials;
use crate::pass::document::PassDocument;
use crate::pass::packager::{PackageRequest, PassPackager, PkPassPackager};
use crate::{Error, Result};

/// Image files bundled into every pass when present in the images directory.
const PASS_IMAGES: &[&str] = &["icon.png", "icon@2x.png", "logo.png"];

/// Builder for exporting pass documents as sealed artifacts.
///
/// # Example
///
/// ```ignore
/// use skypass::PassExporter;
///
/// let bytes = PassExporter::new()
///     .pkcs12("certs/pass.p12")
///     .password("secret")
///     .images_dir("images")
///     .export(&document)?;
/// ```
pub struct PassExporter {
    certificate: Option<PathBuf>,
    private_key: Option<PathBuf>,
    pkcs12: Option<PathBuf>,
    password: Option<SecretString>,
    images_dir: Option<PathBuf>,
    packager: Box<dyn PassPackager>,
}

impl PassExporter {
    pub fn new() -> Self {
        Self {
            certificate: None,
            private_key: None,
            pkcs12: None,
            password: None,
            images_dir: None,
            packager: Box::new(PkPassPackager),
        }
    }

    /// Set the pass-signing certificate path.
    ///
    /// A `.p12` path is treated as a PKCS#12 container (certificate and key
    /// extracted with the configured password). Anything else is read as a
    /// PEM certificate whose key lives alongside it (`{stem}.key`, falling
    /// back to `{stem}.pem`) unless [`private_key`](Self::private_key) says
    /// otherwise.
    pub fn certificate(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if path.extension().and_then(|e| e.to_str()) == Some("p12") {
            self.pkcs12 = Some(path);
        } else {
            self.certificate = Some(path);
        }
        self
    }

    /// Set an explicit private key path (PEM), overriding sibling lookup.
    pub fn private_key(mut self, path: impl AsRef<Path>) -> Self {
        self.private_key = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a PKCS#12 container holding both certificate and key.
    pub fn pkcs12(mut self, path: impl AsRef<Path>) -> Self {
        self.pkcs12 = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the PKCS#12 password. Held in a [`SecretString`] and zeroized on
    /// drop.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Set the directory searched for `icon.png`, `icon@2x.png`, `logo.png`.
    pub fn images_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.images_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the packaging collaborator (default: built-in `.pkpass`
    /// packager).
    pub fn packager(mut self, packager: Box<dyn PassPackager>) -> Self {
        self.packager = packager;
        self
    }

    /// Validate the builder configuration.
    pub fn validate(&self) -> Result<()> {
        let has_p12 = self.pkcs12.is_some();
        let has_pem = self.certificate.is_some();

        if has_p12 && has_pem {
            return Err(Error::Config(
                "Cannot specify both PKCS#12 and PEM certificate".into(),
            ));
        }
        if !has_p12 && !has_pem {
            return Err(Error::MissingCredentials(
                "Must specify either a PKCS#12 container or a PEM certificate".into(),
            ));
        }
        Ok(())
    }

    /// Export one pass document as sealed artifact bytes.
    ///
    /// Credential extraction or packaging failure aborts the whole request;
    /// there is never a partial artifact.
    pub fn export(&self, document: &PassDocument) -> Result<Vec<u8>> {
        let credentials = self.load_credentials()?;
        let request = PackageRequest {
            pass_json: serde_json::to_vec(document)?,
            assets: self.collect_images(),
        };
        self.packager.package(&request, &credentials)
    }

    fn load_credentials(&self) -> Result<PassCredentials> {
        self.validate()?;

        if let Some(ref p12_path) = self.pkcs12 {
            let p12_data = fs::read(p12_path)?;
            let password = self
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_str())
                .unwrap_or("");
            return PassCredentials::from_p12(&p12_data, password);
        }

        let cert_path = self
            .certificate
            .as_ref()
            .ok_or_else(|| Error::MissingCredentials("No certificate configured".into()))?;
        let key_path = match self.private_key {
            Some(ref path) => path.clone(),
            None => sibling_key_path(cert_path)?,
        };

        let cert_pem = fs::read(cert_path)?;
        let key_pem = fs::read(key_path)?;
        PassCredentials::from_pem(&cert_pem, &key_pem)
    }

    fn collect_images(&self) -> Vec<(String, Vec<u8>)> {
        let Some(ref images_dir) = self.images_dir else {
            return Vec::new();
        };
        let mut assets = Vec::new();
        for name in PASS_IMAGES {
            let path = images_dir.join(name);
            match fs::read(&path) {
                Ok(data) => assets.push((name.to_string(), data)),
                Err(_) => debug!(image = name, "pass image not found, skipping"),
            }
        }
        assets
    }
}

impl Default for PassExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the co-located private key for a PEM certificate: `{stem}.key`
/// first, then `{stem}.pem`.
fn sibling_key_path(cert_path: &Path) -> Result<PathBuf> {
    let stem = cert_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config(format!("Invalid certificate path: {}", cert_path.display())))?;
    let dir = cert_path.parent().unwrap_or_else(|| Path::new("."));

    let key = dir.join(format!("{stem}.key"));
    if key.exists() {
        return Ok(key);
    }
    Ok(dir.join(format!("{stem}.pem")))
}
