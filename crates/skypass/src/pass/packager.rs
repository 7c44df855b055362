//! Pass bundle packaging.
//!
//! A `.pkpass` artifact is a ZIP container holding `pass.json`, the image
//! assets, a `manifest.json` of SHA-1 file digests, and a detached CMS
//! `signature` over the manifest. [`PassPackager`] is the collaborator seam;
//! [`PkPassPackager`] is the built-in implementation.
//!
//! Packaging is all-or-nothing: any failure aborts the request with
//! [`Error::PassGeneration`] and no partial artifact.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use cryptographic_message_syntax::{SignedDataBuilder, SignerBuilder};
use sha1::{Digest as _, Sha1};
use x509_certificate::InMemorySigningKeyPair;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::crypto::PassCredentials;
use crate::{Error, Result};

/// Everything the packaging collaborator needs for one pass: the serialized
/// `pass.json` plus named image assets.
pub struct PackageRequest {
    pub pass_json: Vec<u8>,
    pub assets: Vec<(String, Vec<u8>)>,
}

/// External packaging collaborator seam.
pub trait PassPackager: Send + Sync {
    /// Bundle and seal one pass, returning the artifact bytes.
    fn package(&self, request: &PackageRequest, credentials: &PassCredentials) -> Result<Vec<u8>>;
}

/// Built-in `.pkpass` packager: manifest, CMS signature, deflated ZIP.
#[derive(Debug, Default)]
pub struct PkPassPackager;

impl PassPackager for PkPassPackager {
    fn package(&self, request: &PackageRequest, credentials: &PassCredentials) -> Result<Vec<u8>> {
        let mut files: Vec<(String, &[u8])> = vec![("pass.json".to_string(), &request.pass_json)];
        for (name, data) in &request.assets {
            files.push((name.clone(), data));
        }

        let manifest = build_manifest(&files)?;
        let signature = sign_manifest(&manifest, credentials)?;

        files.push(("manifest.json".to_string(), &manifest));
        files.push(("signature".to_string(), &signature));
        write_bundle(&files)
    }
}

/// Build `manifest.json`: a map from file name to the SHA-1 hex digest of
/// its content. Keys are sorted for stable output.
pub fn build_manifest(files: &[(String, &[u8])]) -> Result<Vec<u8>> {
    let mut manifest = BTreeMap::new();
    for (name, data) in files {
        manifest.insert(name.clone(), hex::encode(Sha1::digest(data)));
    }
    Ok(serde_json::to_vec(&manifest)?)
}

/// Produce the detached CMS signature over the manifest.
fn sign_manifest(manifest: &[u8], credentials: &PassCredentials) -> Result<Vec<u8>> {
    let key_pair = InMemorySigningKeyPair::from_pkcs8_der(&credentials.key_der)
        .map_err(|e| Error::PassGeneration(format!("Failed to load signing key: {e}")))?;

    let signer = SignerBuilder::new(&key_pair, credentials.certificate.clone());

    let mut builder = SignedDataBuilder::default()
        .content_external(manifest.to_vec())
        .signer(signer);
    for cert in &credentials.chain {
        builder = builder.certificate(cert.clone());
    }

    builder
        .build_der()
        .map_err(|e| Error::PassGeneration(format!("Failed to build CMS signature: {e}")))
}

/// Write the deflated ZIP container.
fn write_bundle(files: &[(String, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in files {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
