//! Digest envelope and barcode payload wire types.
//!
//! A [`SignatureDigest`] binds a data string to a signing identity: a
//! mandatory secret hash plus an optional RSA signature. It is embedded in
//! the pass barcode and echoed back by scanners for verification.

use serde::{Deserialize, Serialize};

use crate::crypto::identity::SigningIdentity;

/// Hash-plus-signature envelope proving a data string's authenticity.
///
/// Wire format: `{"hash": "<sha256-hex>", "signature": "<base64>"}` with
/// `signature` omitted when the identity could not (or was configured not
/// to) sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDigest {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<String>,
}

/// The JSON payload carried in a boarding pass QR code, and the body of a
/// verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodePayload {
    pub ticket: String,
    #[serde(rename = "signatureDigest")]
    pub signature_digest: SignatureDigest,
}

impl BarcodePayload {
    /// Build the payload for a ticket identifier, digesting it with the
    /// airline's signing identity.
    pub fn for_ticket(ticket_identifier: &str, identity: &SigningIdentity) -> Self {
        Self {
            ticket: ticket_identifier.to_string(),
            signature_digest: identity.digest(ticket_identifier),
        }
    }

    /// Check the embedded digest against the ticket identifier it claims to
    /// cover. This is the verification endpoint contract in library form.
    pub fn verify(&self, identity: &SigningIdentity) -> bool {
        identity.verify_digest(&self.ticket, &self.signature_digest)
    }
}
