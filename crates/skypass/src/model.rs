//! Domain value objects supplied by the storage collaborator.
//!
//! These records are read-only from the perspective of pass assembly: the
//! hosting service loads them, hands them to the issuer, and nothing here
//! writes them back. JSON key casing matches the established wire format
//! (mostly camelCase, with identifier columns kept snake_case).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An aircraft operated by the airline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub registration: String,
    #[serde(rename = "type")]
    pub aircraft_type: String,
}

/// A passenger as displayed on the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    #[serde(rename = "formattedName", default)]
    pub formatted_name: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "middleName", default)]
    pub middle_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
}

impl Passenger {
    /// Display name for pass fields: the formatted name or empty string.
    pub fn display_name(&self) -> &str {
        self.formatted_name.as_deref().unwrap_or("")
    }
}

/// A flight endpoint: ICAO code plus the tz database identifier of the
/// airport, when known (e.g. `"Europe/London"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportRef {
    pub icao: String,
    #[serde(rename = "timezone_identifier", default)]
    pub timezone_identifier: String,
}

impl AirportRef {
    pub fn new(icao: impl Into<String>) -> Self {
        Self {
            icao: icao.into().to_uppercase(),
            timezone_identifier: String::new(),
        }
    }
}

/// A scheduled flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub origin: AirportRef,
    pub destination: AirportRef,
    pub gate: String,
    #[serde(rename = "flightNumber")]
    pub flight_number: String,
    pub aircraft: Aircraft,
    #[serde(rename = "scheduledDepartureDate")]
    pub scheduled_departure_date: DateTime<FixedOffset>,
}

impl Flight {
    /// Whether the flight carries a real flight number.
    ///
    /// Some operators fly under the aircraft registration itself; a flight
    /// number equal to the registration is treated as absent so the pass
    /// falls back to showing the registration under an "Aircraft" label.
    pub fn has_flight_number(&self) -> bool {
        !self.flight_number.is_empty() && self.flight_number != self.aircraft.registration
    }
}

/// One issued ticket: a passenger on a flight in a seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub passenger: Passenger,
    pub flight: Flight,
    #[serde(rename = "seatNumber")]
    pub seat_number: String,
    #[serde(rename = "ticket_identifier", default)]
    pub ticket_identifier: String,
    #[serde(rename = "customLabelValue", default)]
    pub custom_label_value: String,
}

impl Ticket {
    /// Whether this ticket should show the airline's custom auxiliary field.
    ///
    /// Requires both the settings flag and a non-empty value on the ticket.
    /// A ticket with the flag enabled but no value falls through to the
    /// aircraft-registration auxiliary field instead.
    pub fn has_custom_label(&self, settings: &AirlineSettings) -> bool {
        settings.custom_label_enabled && !self.custom_label_value.is_empty()
    }
}

/// The issuing airline. The `apple_identifier` doubles as the signing
/// identity name for barcode digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    #[serde(rename = "airline_name", default)]
    pub airline_name: Option<String>,
    pub apple_identifier: String,
}

/// Per-airline presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlineSettings {
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "foregroundColor")]
    pub foreground_color: String,
    #[serde(rename = "labelColor")]
    pub label_color: String,
    #[serde(rename = "customLabel")]
    pub custom_label: String,
    #[serde(rename = "customLabelEnabled")]
    pub custom_label_enabled: bool,
}

impl Default for AirlineSettings {
    fn default() -> Self {
        Self {
            background_color: "rgb(189,144,71)".to_string(),
            foreground_color: "rgb(0,0,0)".to_string(),
            label_color: "rgb(255,255,255)".to_string(),
            custom_label: "Boarding Group".to_string(),
            custom_label_enabled: true,
        }
    }
}

impl AirlineSettings {
    /// Convert a color to `#rrggbb` hex form. Accepts hex (returned as-is)
    /// or `rgb(r, g, b)`; returns `None` for anything else.
    pub fn to_hex(color: &str) -> Option<String> {
        if color.starts_with('#') {
            return Some(color.to_string());
        }
        let (r, g, b) = parse_rgb(color)?;
        Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    /// Convert a color to `rgb(r, g, b)` form. Accepts rgb (returned as-is)
    /// or `#rrggbb`; returns `None` for anything else.
    pub fn to_rgb(color: &str) -> Option<String> {
        if color.starts_with("rgb") {
            return Some(color.to_string());
        }
        let hex = color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(format!("rgb({}, {}, {})", r, g, b))
    }
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let inner = color.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flight(flight_number: &str, registration: &str) -> Flight {
        Flight {
            origin: AirportRef::new("EGTF"),
            destination: AirportRef::new("LFMD"),
            gate: "1".to_string(),
            flight_number: flight_number.to_string(),
            aircraft: Aircraft {
                registration: registration.to_string(),
                aircraft_type: "Cessna 172".to_string(),
            },
            scheduled_departure_date: "2024-06-19T07:00:00+00:00".parse().unwrap(),
        }
    }

    #[test]
    fn test_has_flight_number() {
        assert!(sample_flight("FF123", "N122DR").has_flight_number());
    }

    #[test]
    fn test_flight_number_equal_to_registration_is_absent() {
        assert!(!sample_flight("N122DR", "N122DR").has_flight_number());
    }

    #[test]
    fn test_empty_flight_number_is_absent() {
        assert!(!sample_flight("", "N122DR").has_flight_number());
    }

    #[test]
    fn test_custom_label_requires_flag_and_value() {
        let mut ticket = Ticket {
            passenger: Passenger {
                formatted_name: Some("John Doe".to_string()),
                first_name: None,
                middle_name: None,
                last_name: None,
            },
            flight: sample_flight("FF123", "N122DR"),
            seat_number: "12A".to_string(),
            ticket_identifier: "t-1".to_string(),
            custom_label_value: "Group 1".to_string(),
        };
        let mut settings = AirlineSettings::default();
        assert!(ticket.has_custom_label(&settings));

        settings.custom_label_enabled = false;
        assert!(!ticket.has_custom_label(&settings));

        settings.custom_label_enabled = true;
        ticket.custom_label_value.clear();
        assert!(!ticket.has_custom_label(&settings));
    }

    #[test]
    fn test_color_round_trip() {
        assert_eq!(
            AirlineSettings::to_hex("rgb(189,144,71)").as_deref(),
            Some("#bd9047")
        );
        assert_eq!(
            AirlineSettings::to_rgb("#bd9047").as_deref(),
            Some("rgb(189, 144, 71)")
        );
        assert_eq!(AirlineSettings::to_hex("#bd9047").as_deref(), Some("#bd9047"));
        assert!(AirlineSettings::to_hex("not a color").is_none());
    }

    #[test]
    fn test_ticket_json_keys() {
        let ticket = Ticket {
            passenger: Passenger {
                formatted_name: Some("John Doe".to_string()),
                first_name: None,
                middle_name: None,
                last_name: None,
            },
            flight: sample_flight("FF123", "N122DR"),
            seat_number: "12A".to_string(),
            ticket_identifier: "t-1".to_string(),
            custom_label_value: String::new(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["seatNumber"], "12A");
        assert_eq!(json["flight"]["flightNumber"], "FF123");
        assert_eq!(json["flight"]["aircraft"]["type"], "Cessna 172");
        assert_eq!(json["passenger"]["formattedName"], "John Doe");
        assert_eq!(json["ticket_identifier"], "t-1");
    }
}
