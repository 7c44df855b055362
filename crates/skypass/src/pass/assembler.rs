//! Deterministic boarding pass assembly.
//!
//! Transforms a ticket + airline + settings triple into a [`PassDocument`]
//! with a fixed field layout, so downstream packaging and barcode scanning
//! behave identically across runs. Field order matters everywhere: the
//! packaging step renders fields in list order.

use chrono_tz::Tz;
use tracing::debug;

use crate::airports::{fit_name, AirportCatalog, AirportInfo};
use crate::crypto::{BarcodePayload, SigningIdentity};
use crate::model::{Airline, AirlineSettings, Ticket};
use crate::pass::document::{
    Barcode, BoardingPassFields, PassDocument, PassField, PassLocation, BARCODE_FORMAT_QR,
    BARCODE_MESSAGE_ENCODING, DEFAULT_DESCRIPTION, DEFAULT_LOGO_TEXT, FORMAT_VERSION,
    ORGANIZATION_NAME, PASS_TYPE_IDENTIFIER, TEAM_IDENTIFIER, TRANSIT_TYPE_AIR,
};
use crate::pass::locale::localize;
use crate::Result;

/// Length budget for primary-field airport labels.
const FIT_NAME_MAX: usize = 20;

/// Wall-clock format of the auxiliary departure field, e.g. `Wed Jun 19, 08:00`.
const DEPARTURE_FORMAT: &str = "%a %b %d, %H:%M";

/// Pass `relevantDate` format. The `%:z` keeps the colon in the UTC offset
/// (`+01:00`, never `+0100`).
const RELEVANT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Builds one [`PassDocument`] from a ticket/airline/settings snapshot.
pub struct PassAssembler<'a> {
    ticket: &'a Ticket,
    airline: &'a Airline,
    settings: &'a AirlineSettings,
    catalog: &'a dyn AirportCatalog,
    identity: &'a SigningIdentity,
    language: String,
}

impl<'a> PassAssembler<'a> {
    pub fn new(
        ticket: &'a Ticket,
        airline: &'a Airline,
        settings: &'a AirlineSettings,
        catalog: &'a dyn AirportCatalog,
        identity: &'a SigningIdentity,
    ) -> Self {
        Self {
            ticket,
            airline,
            settings,
            catalog,
            identity,
            language: "en".to_string(),
        }
    }

    /// Set the label language (en/fr/de/es). Defaults to English.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Assemble the complete pass document.
    pub fn assemble(&self) -> Result<PassDocument> {
        let origin_info = self.catalog.info(&self.ticket.flight.origin.icao);
        let destination_info = self.catalog.info(&self.ticket.flight.destination.icao);

        let boarding_pass = BoardingPassFields {
            transit_type: TRANSIT_TYPE_AIR.to_string(),
            header_fields: self.header_fields(),
            primary_fields: self.primary_fields(origin_info.as_ref(), destination_info.as_ref()),
            secondary_fields: self.secondary_fields(),
            auxiliary_fields: self.auxiliary_fields(),
            back_fields: self.back_fields(origin_info.as_ref(), destination_info.as_ref()),
            locations: self.locations(origin_info.as_ref(), destination_info.as_ref()),
        };

        let logo_text = self
            .airline
            .airline_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_LOGO_TEXT)
            .to_string();

        Ok(PassDocument {
            format_version: FORMAT_VERSION,
            pass_type_identifier: PASS_TYPE_IDENTIFIER.to_string(),
            organization_name: ORGANIZATION_NAME.to_string(),
            team_identifier: TEAM_IDENTIFIER.to_string(),
            serial_number: self.ticket.ticket_identifier.clone(),
            description: DEFAULT_DESCRIPTION.to_string(),
            background_color: self.settings.background_color.clone(),
            foreground_color: self.settings.foreground_color.clone(),
            label_color: self.settings.label_color.clone(),
            logo_text,
            relevant_date: self
                .ticket
                .flight
                .scheduled_departure_date
                .format(RELEVANT_DATE_FORMAT)
                .to_string(),
            boarding_pass,
            barcode: self.barcode()?,
        })
    }

    fn label(&self, text: &str) -> String {
        localize(&self.language, text).to_string()
    }

    /// Seat first, then the flight number — or the aircraft registration
    /// when the flight has no real number (some operators fly under the
    /// registration itself).
    fn header_fields(&self) -> Vec<PassField> {
        let flight = &self.ticket.flight;
        let mut fields = vec![PassField::new(
            "seat",
            self.label("Seat"),
            &self.ticket.seat_number,
        )];
        if flight.has_flight_number() {
            fields.push(PassField::new(
                "flight-number",
                self.label("Flight"),
                &flight.flight_number,
            ));
        } else {
            fields.push(PassField::new(
                "flight-number",
                self.label("Aircraft"),
                &flight.aircraft.registration,
            ));
        }
        fields
    }

    fn primary_fields(
        &self,
        origin_info: Option<&AirportInfo>,
        destination_info: Option<&AirportInfo>,
    ) -> Vec<PassField> {
        let flight = &self.ticket.flight;
        vec![
            PassField::new(
                "origin",
                fit_name(&flight.origin.icao, origin_info, FIT_NAME_MAX),
                &flight.origin.icao,
            ),
            PassField::new(
                "destination",
                fit_name(&flight.destination.icao, destination_info, FIT_NAME_MAX),
                &flight.destination.icao,
            ),
        ]
    }

    fn secondary_fields(&self) -> Vec<PassField> {
        vec![
            PassField::new(
                "passenger-name",
                self.label("Passenger"),
                self.ticket.passenger.display_name(),
            ),
            PassField::new("gate", self.label("Gate"), &self.ticket.flight.gate),
        ]
    }

    /// Departure date first, then exactly one extra slot: the airline's
    /// custom label when the ticket qualifies, otherwise the aircraft
    /// registration when the flight has a real flight number.
    fn auxiliary_fields(&self) -> Vec<PassField> {
        let flight = &self.ticket.flight;
        let mut fields = vec![PassField::new(
            "date",
            self.label("Departs"),
            self.departure_local(),
        )];

        let has_custom = self.ticket.has_custom_label(self.settings);
        if has_custom {
            fields.push(PassField::new(
                "custom-label",
                &self.settings.custom_label,
                &self.ticket.custom_label_value,
            ));
        } else if flight.has_flight_number() {
            fields.push(PassField::new(
                "aircraft",
                self.label("Aircraft"),
                &flight.aircraft.registration,
            ));
        }
        fields
    }

    /// Scheduled departure in the origin airport's local timezone, falling
    /// back to the stored offset when the identifier is missing or unknown.
    fn departure_local(&self) -> String {
        let flight = &self.ticket.flight;
        let date = flight.scheduled_departure_date;
        let tz_id = &flight.origin.timezone_identifier;
        if !tz_id.is_empty() {
            match tz_id.parse::<Tz>() {
                Ok(tz) => return date.with_timezone(&tz).format(DEPARTURE_FORMAT).to_string(),
                Err(_) => {
                    debug!(timezone = %tz_id, "unrecognized timezone identifier, using stored offset");
                }
            }
        }
        date.format(DEPARTURE_FORMAT).to_string()
    }

    fn back_fields(
        &self,
        origin_info: Option<&AirportInfo>,
        destination_info: Option<&AirportInfo>,
    ) -> Vec<PassField> {
        let mut fields = vec![PassField::new(
            "passenger-name",
            self.label("Passenger"),
            self.ticket.passenger.display_name(),
        )];

        for (which, title, info) in [
            ("origin", "Origin", origin_info),
            ("destination", "Destination", destination_info),
        ] {
            let Some(info) = info else {
                // Lookup miss: the pass keeps a reduced back side.
                continue;
            };

            if let Some(url) = info.map_url() {
                fields.push(PassField::new(
                    format!("{which}-map-url"),
                    format!("{title} Airport Location"),
                    url,
                ));
            }

            let attributes: [(&str, &str, Option<&String>); 6] = [
                ("name", "Name", info.name.as_ref()),
                ("municipality", "Municipality", info.municipality.as_ref()),
                ("iso-country", "Iso Country", info.iso_country.as_ref()),
                ("iata-code", "Iata Code", info.iata_code.as_ref()),
                ("home-link", "Home Link", info.home_link.as_ref()),
                ("wikipedia-link", "Wikipedia Link", info.wikipedia_link.as_ref()),
            ];
            for (key, attribute_title, value) in attributes {
                let Some(value) = value.filter(|v| !v.is_empty()) else {
                    continue;
                };
                fields.push(PassField::new(
                    format!("{which}-{key}"),
                    format!("{title} Airport {attribute_title}"),
                    value,
                ));
            }
        }
        fields
    }

    /// Welcome geofence at the origin, thank-you geofence at the
    /// destination. Origin and destination sharing an ICAO emit a single
    /// entry to avoid duplicate geofences at one physical location.
    fn locations(
        &self,
        origin_info: Option<&AirportInfo>,
        destination_info: Option<&AirportInfo>,
    ) -> Option<Vec<PassLocation>> {
        let flight = &self.ticket.flight;
        let mut locations = Vec::new();

        if let Some((latitude, longitude)) = origin_info.and_then(AirportInfo::coordinates) {
            let name = airport_display_name(origin_info, &flight.origin.icao);
            locations.push(PassLocation {
                latitude,
                longitude,
                relevant_text: format!("Welcome to {name}"),
            });
        }

        let same_airport = flight
            .destination
            .icao
            .eq_ignore_ascii_case(&flight.origin.icao);
        if !same_airport {
            if let Some((latitude, longitude)) = destination_info.and_then(AirportInfo::coordinates)
            {
                let name = airport_display_name(destination_info, &flight.destination.icao);
                locations.push(PassLocation {
                    latitude,
                    longitude,
                    relevant_text: format!("Thank you for flying with us to {name}"),
                });
            }
        }

        if locations.is_empty() {
            None
        } else {
            Some(locations)
        }
    }

    /// Barcode payload: ticket identifier plus its digest, signed by the
    /// airline's identity. Degrades to a hash-only digest when the identity
    /// cannot sign.
    fn barcode(&self) -> Result<Barcode> {
        let payload = BarcodePayload::for_ticket(&self.ticket.ticket_identifier, self.identity);
        Ok(Barcode {
            format: BARCODE_FORMAT_QR.to_string(),
            message: serde_json::to_string(&payload)?,
            message_encoding: BARCODE_MESSAGE_ENCODING.to_string(),
        })
    }
}

fn airport_display_name(info: Option<&AirportInfo>, icao: &str) -> String {
    info.and_then(|i| i.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| icao.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::{NullCatalog, StaticCatalog};
    use crate::model::{Aircraft, AirportRef, Flight, Passenger};

    fn identity() -> SigningIdentity {
        // Keyless identity: digests degrade to hash-only, which is all the
        // assembler needs.
        SigningIdentity::with_keys("test-air", "s3cret", true, None, None)
    }

    fn ticket(flight_number: &str, custom_label_value: &str) -> Ticket {
        Ticket {
            passenger: Passenger {
                formatted_name: Some("John Doe".to_string()),
                first_name: None,
                middle_name: None,
                last_name: None,
            },
            flight: Flight {
                origin: AirportRef {
                    icao: "EGLL".to_string(),
                    timezone_identifier: "Europe/London".to_string(),
                },
                destination: AirportRef::new("KJFK"),
                gate: "2".to_string(),
                flight_number: flight_number.to_string(),
                aircraft: Aircraft {
                    registration: "N122DR".to_string(),
                    aircraft_type: "Cessna 172".to_string(),
                },
                scheduled_departure_date: "2024-06-19T07:00:00+00:00".parse().unwrap(),
            },
            seat_number: "12A".to_string(),
            ticket_identifier: "ticket-xyz".to_string(),
            custom_label_value: custom_label_value.to_string(),
        }
    }

    fn airline() -> Airline {
        Airline {
            airline_name: Some("Acme Air".to_string()),
            apple_identifier: "apple-acme".to_string(),
        }
    }

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        catalog.insert(AirportInfo {
            ident: "EGLL".to_string(),
            name: Some("London Heathrow Airport".to_string()),
            municipality: Some("London".to_string()),
            iso_country: Some("GB".to_string()),
            latitude_deg: Some(51.4706),
            longitude_deg: Some(-0.461941),
            iata_code: Some("LHR".to_string()),
            ..Default::default()
        });
        catalog.insert(AirportInfo {
            ident: "KJFK".to_string(),
            name: Some("John F Kennedy International Airport".to_string()),
            municipality: Some("New York".to_string()),
            iso_country: Some("US".to_string()),
            latitude_deg: Some(40.639801),
            longitude_deg: Some(-73.7789),
            iata_code: Some("JFK".to_string()),
            ..Default::default()
        });
        catalog
    }

    fn assemble(ticket: &Ticket, settings: &AirlineSettings) -> PassDocument {
        let airline = airline();
        let catalog = catalog();
        let identity = identity();
        PassAssembler::new(ticket, &airline, settings, &catalog, &identity)
            .assemble()
            .unwrap()
    }

    #[test]
    fn test_end_to_end_layout() {
        let mut settings = AirlineSettings::default();
        settings.custom_label_enabled = false;
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &settings);

        let fields = &document.boarding_pass;
        assert_eq!(
            fields.header_fields[0],
            PassField::new("seat", "Seat", "12A")
        );
        assert_eq!(fields.header_fields[1].label, "Flight");
        assert_eq!(fields.header_fields[1].value, "FF123");

        assert_eq!(fields.primary_fields[0].value, "EGLL");
        assert_eq!(fields.primary_fields[0].label, "London"); // name over budget
        assert_eq!(fields.primary_fields[1].value, "KJFK");
        assert_eq!(fields.primary_fields[1].label, "New York");

        assert_eq!(fields.secondary_fields[0].value, "John Doe");
        assert_eq!(fields.secondary_fields[1].value, "2");

        // Date plus aircraft registration: custom label disabled, flight
        // has a real number.
        assert_eq!(fields.auxiliary_fields.len(), 2);
        assert_eq!(fields.auxiliary_fields[1].key, "aircraft");
        assert_eq!(fields.auxiliary_fields[1].value, "N122DR");

        assert_eq!(document.serial_number, "ticket-xyz");
        assert_eq!(document.logo_text, "Acme Air");
    }

    #[test]
    fn test_header_falls_back_to_registration() {
        let ticket = ticket("N122DR", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        let header = &document.boarding_pass.header_fields[1];
        assert_eq!(header.key, "flight-number");
        assert_eq!(header.label, "Aircraft");
        assert_eq!(header.value, "N122DR");
    }

    #[test]
    fn test_departure_in_origin_timezone_with_dst() {
        // 07:00 UTC on a June date is 08:00 in London (BST).
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        assert_eq!(
            document.boarding_pass.auxiliary_fields[0].value,
            "Wed Jun 19, 08:00"
        );
    }

    #[test]
    fn test_departure_falls_back_to_stored_offset() {
        let mut ticket = ticket("FF123", "");
        ticket.flight.origin.timezone_identifier = "Mars/Olympus".to_string();
        let document = assemble(&ticket, &AirlineSettings::default());
        assert_eq!(
            document.boarding_pass.auxiliary_fields[0].value,
            "Wed Jun 19, 07:00"
        );
    }

    #[test]
    fn test_custom_label_takes_the_extra_slot() {
        let ticket = ticket("FF123", "Group 1");
        let settings = AirlineSettings::default(); // custom labels enabled
        let document = assemble(&ticket, &settings);
        let auxiliary = &document.boarding_pass.auxiliary_fields;
        assert_eq!(auxiliary.len(), 2);
        assert_eq!(auxiliary[1].key, "custom-label");
        assert_eq!(auxiliary[1].label, "Boarding Group");
        assert_eq!(auxiliary[1].value, "Group 1");
        assert!(!auxiliary.iter().any(|f| f.key == "aircraft"));
    }

    #[test]
    fn test_custom_label_enabled_but_empty_value_falls_through() {
        let ticket = ticket("FF123", "");
        let settings = AirlineSettings::default();
        let document = assemble(&ticket, &settings);
        let auxiliary = &document.boarding_pass.auxiliary_fields;
        assert_eq!(auxiliary.len(), 2);
        assert_eq!(auxiliary[1].key, "aircraft");
    }

    #[test]
    fn test_no_extra_auxiliary_slot_without_number_or_label() {
        let mut settings = AirlineSettings::default();
        settings.custom_label_enabled = false;
        let ticket = ticket("N122DR", ""); // number == registration
        let document = assemble(&ticket, &settings);
        assert_eq!(document.boarding_pass.auxiliary_fields.len(), 1);
    }

    #[test]
    fn test_relevant_date_keeps_colon_in_offset() {
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        assert_eq!(document.relevant_date, "2024-06-19T07:00:00+00:00");
    }

    #[test]
    fn test_back_fields_enumerate_airport_attributes() {
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        let back = &document.boarding_pass.back_fields;

        assert_eq!(back[0].key, "passenger-name");
        assert_eq!(back[1].key, "origin-map-url");
        assert_eq!(back[1].label, "Origin Airport Location");
        assert!(back[1].value.starts_with("https://www.google.com/maps/place/"));

        let origin_name = back.iter().find(|f| f.key == "origin-name").unwrap();
        assert_eq!(origin_name.label, "Origin Airport Name");
        assert_eq!(origin_name.value, "London Heathrow Airport");

        let dest_country = back.iter().find(|f| f.key == "destination-iso-country").unwrap();
        assert_eq!(dest_country.label, "Destination Airport Iso Country");
        assert_eq!(dest_country.value, "US");

        // home_link/wikipedia_link are unset in the fixture: no placeholders.
        assert!(!back.iter().any(|f| f.key.ends_with("home-link")));
        assert!(!back.iter().any(|f| f.key.ends_with("wikipedia-link")));
    }

    #[test]
    fn test_locations_welcome_and_thank_you() {
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        let locations = document.boarding_pass.locations.unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations[0].relevant_text,
            "Welcome to London Heathrow Airport"
        );
        assert_eq!(
            locations[1].relevant_text,
            "Thank you for flying with us to John F Kennedy International Airport"
        );
    }

    #[test]
    fn test_same_airport_emits_single_location() {
        let mut ticket = ticket("FF123", "");
        ticket.flight.destination = ticket.flight.origin.clone();
        let document = assemble(&ticket, &AirlineSettings::default());
        let locations = document.boarding_pass.locations.unwrap();
        assert_eq!(locations.len(), 1);
        assert!(locations[0].relevant_text.starts_with("Welcome to"));
    }

    #[test]
    fn test_missing_reference_data_degrades_silently() {
        let ticket = ticket("FF123", "");
        let airline = airline();
        let settings = AirlineSettings::default();
        let catalog = NullCatalog;
        let identity = identity();
        let document = PassAssembler::new(&ticket, &airline, &settings, &catalog, &identity)
            .assemble()
            .unwrap();

        // Primary labels fall back to the ICAO codes.
        assert_eq!(document.boarding_pass.primary_fields[0].label, "EGLL");
        // Back side reduces to the passenger, no locations at all.
        assert_eq!(document.boarding_pass.back_fields.len(), 1);
        assert!(document.boarding_pass.locations.is_none());
    }

    #[test]
    fn test_barcode_payload_verifies() {
        let ticket = ticket("FF123", "");
        let document = assemble(&ticket, &AirlineSettings::default());
        assert_eq!(document.barcode.format, "PKBarcodeFormatQR");
        assert_eq!(document.barcode.message_encoding, "iso-8859-1");

        let payload: BarcodePayload = serde_json::from_str(&document.barcode.message).unwrap();
        assert_eq!(payload.ticket, "ticket-xyz");
        assert!(payload.verify(&identity()));
        assert!(!payload.verify(&SigningIdentity::with_keys(
            "other", "wrong-secret", true, None, None
        )));
    }

    #[test]
    fn test_localized_labels() {
        let ticket = ticket("FF123", "");
        let airline = airline();
        let settings = AirlineSettings::default();
        let catalog = NullCatalog;
        let identity = identity();
        let document = PassAssembler::new(&ticket, &airline, &settings, &catalog, &identity)
            .language("fr")
            .assemble()
            .unwrap();
        assert_eq!(document.boarding_pass.header_fields[0].label, "Siège");
        assert_eq!(document.boarding_pass.secondary_fields[1].label, "Porte");
        assert_eq!(document.boarding_pass.auxiliary_fields[0].label, "Départ");
    }
}
