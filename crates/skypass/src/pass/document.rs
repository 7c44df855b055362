//! In-memory representation of one boarding pass.
//!
//! Serializes to the exact JSON consumed by the packaging step. Field lists
//! keep their construction order; packaging renders fields in list order, so
//! order is part of the contract.

use serde::{Deserialize, Serialize};

/// Deployment constants baked into every pass.
pub const FORMAT_VERSION: u32 = 1;
pub const PASS_TYPE_IDENTIFIER: &str = "pass.net.ro-z.flyfunboardingpass";
pub const TEAM_IDENTIFIER: &str = "M7QSSF3624";
pub const ORGANIZATION_NAME: &str = "FlyFun Boarding Pass";
pub const DEFAULT_DESCRIPTION: &str = "Boarding Pass";
pub const DEFAULT_LOGO_TEXT: &str = "FlyFun Airline";
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgb(189,144,71)";
pub const DEFAULT_FOREGROUND_COLOR: &str = "rgb(255,255,255)";
pub const DEFAULT_LABEL_COLOR: &str = "rgb(255,255,255)";

/// One `{key, label, value}` text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassField {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl PassField {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A geofence entry: the pass surfaces on the lock screen near this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "relevantText")]
    pub relevant_text: String,
}

/// QR barcode carrying the signed ticket payload.
///
/// The message encoding is declared Latin-1 because the pass format
/// historically mandates it for QR payloads; the JSON payload must stay
/// ASCII-safe or downstream decoding breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barcode {
    pub format: String,
    pub message: String,
    #[serde(rename = "messageEncoding")]
    pub message_encoding: String,
}

pub const BARCODE_FORMAT_QR: &str = "PKBarcodeFormatQR";
pub const BARCODE_MESSAGE_ENCODING: &str = "iso-8859-1";

/// The `boardingPass` block: transit type plus ordered field lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardingPassFields {
    #[serde(rename = "transitType")]
    pub transit_type: String,
    #[serde(rename = "headerFields")]
    pub header_fields: Vec<PassField>,
    #[serde(rename = "primaryFields")]
    pub primary_fields: Vec<PassField>,
    #[serde(rename = "secondaryFields")]
    pub secondary_fields: Vec<PassField>,
    #[serde(rename = "auxiliaryFields")]
    pub auxiliary_fields: Vec<PassField>,
    #[serde(rename = "backFields")]
    pub back_fields: Vec<PassField>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub locations: Option<Vec<PassLocation>>,
}

pub const TRANSIT_TYPE_AIR: &str = "PKTransitTypeAir";

/// One complete boarding pass document, built fresh per request and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassDocument {
    #[serde(rename = "formatVersion")]
    pub format_version: u32,
    #[serde(rename = "passTypeIdentifier")]
    pub pass_type_identifier: String,
    #[serde(rename = "organizationName")]
    pub organization_name: String,
    #[serde(rename = "teamIdentifier")]
    pub team_identifier: String,
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    pub description: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "foregroundColor")]
    pub foreground_color: String,
    #[serde(rename = "labelColor")]
    pub label_color: String,
    #[serde(rename = "logoText")]
    pub logo_text: String,
    #[serde(rename = "relevantDate")]
    pub relevant_date: String,
    #[serde(rename = "boardingPass")]
    pub boarding_pass: BoardingPassFields,
    pub barcode: Barcode,
}
