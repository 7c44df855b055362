//! Apple Wallet boarding pass issuing for small airline operations.
//!
//! The crate turns a ticket (passenger, flight, seat) into a signed
//! `.pkpass` artifact: per-airline RSA identities digest the ticket into a
//! QR barcode payload, the assembler lays out the pass fields, and the
//! exporter seals the bundle with the Apple pass type certificate.
//!
//! [`PassIssuer`] is the high-level entry point; the individual layers
//! (key store, assembler, exporter, packager) stay public for callers that
//! need finer control.

pub mod airports;
pub mod config;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod model;
pub mod pass;

pub use airports::{AirportCatalog, AirportInfo, NullCatalog, StaticCatalog};
pub use config::IssuerConfig;
pub use crypto::{BarcodePayload, KeyStore, PassCredentials, SignatureDigest, SigningIdentity};
pub use error::Error;
pub use issuer::PassIssuer;
pub use pass::{PassAssembler, PassDocument, PassExporter};

pub type Result<T> = std::result::Result<T, Error>;
