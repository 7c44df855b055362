//! High-level issuing facade.
//!
//! Ties the key store, airport catalog, assembler and exporter together
//! behind the three operations a hosting service needs: render a pass
//! document for inspection, export a sealed pass artifact, and verify a
//! scanned barcode digest.

use std::sync::Arc;

use tracing::info;

use crate::airports::AirportCatalog;
use crate::config::IssuerConfig;
use crate::crypto::{KeyStore, SignatureDigest, SigningIdentity};
use crate::model::{Airline, AirlineSettings, Ticket};
use crate::pass::{PassAssembler, PassDocument, PassExporter};
use crate::Result;

/// One issuing service instance.
///
/// Holds the identity key store and the airport catalog; certificate and
/// image paths come from the [`IssuerConfig`]. Cheap to share behind an
/// `Arc` across request handlers.
pub struct PassIssuer {
    config: IssuerConfig,
    keys: KeyStore,
    catalog: Arc<dyn AirportCatalog>,
}

impl PassIssuer {
    pub fn new(config: IssuerConfig, catalog: Arc<dyn AirportCatalog>) -> Self {
        let keys = KeyStore::new(
            config.keys_dir.clone(),
            config.secret.clone(),
            config.use_public_key_signature,
        );
        Self {
            config,
            keys,
            catalog,
        }
    }

    /// The identity signing barcodes for `airline`, created on first use.
    pub fn identity(&self, airline: &Airline) -> Result<Arc<SigningIdentity>> {
        self.keys.load_or_create(&airline.apple_identifier)
    }

    /// Access the underlying key store, e.g. to register in-memory
    /// identities in tests.
    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Assemble the pass document for a ticket without sealing it.
    ///
    /// This is the debug surface: the returned document serializes to the
    /// exact `pass.json` that [`create_pass`](Self::create_pass) would seal.
    pub fn pass_document(
        &self,
        ticket: &Ticket,
        airline: &Airline,
        settings: &AirlineSettings,
        language: &str,
    ) -> Result<PassDocument> {
        let identity = self.identity(airline)?;
        PassAssembler::new(ticket, airline, settings, self.catalog.as_ref(), &identity)
            .language(language)
            .assemble()
    }

    /// Assemble, sign and package one ticket into a sealed pass artifact.
    pub fn create_pass(
        &self,
        ticket: &Ticket,
        airline: &Airline,
        settings: &AirlineSettings,
        language: &str,
    ) -> Result<Vec<u8>> {
        let document = self.pass_document(ticket, airline, settings, language)?;
        let bytes = PassExporter::new()
            .certificate(&self.config.certificate_path)
            .password(self.config.certificate_password.clone())
            .images_dir(&self.config.images_dir)
            .export(&document)?;
        info!(
            ticket = %ticket.ticket_identifier,
            airline = %airline.apple_identifier,
            size = bytes.len(),
            "issued boarding pass"
        );
        Ok(bytes)
    }

    /// Verify a scanned barcode digest against a ticket identifier.
    ///
    /// Returns `false` for any mismatch; never errors on malformed input.
    pub fn verify_ticket(
        &self,
        airline: &Airline,
        ticket_identifier: &str,
        digest: &SignatureDigest,
    ) -> Result<bool> {
        let identity = self.identity(airline)?;
        Ok(identity.verify_digest(ticket_identifier, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::NullCatalog;
    use crate::crypto::SigningIdentity;
    use crate::model::{Aircraft, AirportRef, Flight, Passenger};
    use chrono::DateTime;
    use tempfile::TempDir;

    fn sample_ticket() -> Ticket {
        Ticket {
            passenger: Passenger {
                formatted_name: Some("DOE, John".to_string()),
                first_name: Some("John".to_string()),
                middle_name: None,
                last_name: Some("Doe".to_string()),
            },
            flight: Flight {
                origin: AirportRef::new("EGTF"),
                destination: AirportRef::new("LFAT"),
                gate: "1".to_string(),
                flight_number: "FF123".to_string(),
                aircraft: Aircraft {
                    registration: "N122DR".to_string(),
                    aircraft_type: "SR22T".to_string(),
                },
                scheduled_departure_date: DateTime::parse_from_rfc3339("2024-06-19T07:00:00+00:00")
                    .unwrap(),
            },
            seat_number: "1A".to_string(),
            ticket_identifier: "ticket-42".to_string(),
            custom_label_value: String::new(),
        }
    }

    fn sample_airline() -> Airline {
        Airline {
            airline_name: Some("FlyFun".to_string()),
            apple_identifier: "flyfun-airline".to_string(),
        }
    }

    #[test]
    fn test_pass_document_and_verify_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = IssuerConfig {
            keys_dir: dir.path().to_path_buf(),
            secret: "s3cret".to_string(),
            use_public_key_signature: false,
            ..IssuerConfig::default()
        };
        let issuer = PassIssuer::new(config, Arc::new(NullCatalog));
        // Hash-only identity, no filesystem key generation needed.
        issuer.key_store().insert(SigningIdentity::with_keys(
            "flyfun-airline",
            "s3cret",
            false,
            None,
            None,
        ));

        let ticket = sample_ticket();
        let airline = sample_airline();
        let settings = AirlineSettings::default();

        let document = issuer
            .pass_document(&ticket, &airline, &settings, "en")
            .unwrap();
        assert_eq!(document.serial_number, "ticket-42");

        let payload: crate::BarcodePayload =
            serde_json::from_str(&document.barcode.message).unwrap();
        assert!(issuer
            .verify_ticket(&airline, "ticket-42", &payload.signature_digest)
            .unwrap());
        assert!(!issuer
            .verify_ticket(&airline, "ticket-43", &payload.signature_digest)
            .unwrap());
    }
}
