//! Airport reference data collaborator.
//!
//! The real deployment answers lookups from an aeronautical database; this
//! crate only defines the seam. A lookup miss is never an error: passes
//! degrade to a reduced back side and no geofence entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference information for one airport, keyed by ICAO identifier.
///
/// All attributes beyond `ident` are optional; absent ones are skipped
/// silently during pass assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirportInfo {
    pub ident: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub iso_country: Option<String>,
    #[serde(default)]
    pub latitude_deg: Option<f64>,
    #[serde(default)]
    pub longitude_deg: Option<f64>,
    #[serde(default)]
    pub elevation_ft: Option<f64>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub home_link: Option<String>,
    #[serde(default)]
    pub wikipedia_link: Option<String>,
}

impl AirportInfo {
    /// Google Maps link for the airport, when coordinates are known.
    pub fn map_url(&self) -> Option<String> {
        let (lat, lon) = self.coordinates()?;
        Some(format!("https://www.google.com/maps/place/{},{}", lat, lon))
    }

    /// Latitude/longitude pair, when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude_deg?, self.longitude_deg?))
    }
}

/// Source of airport reference data.
///
/// Implementations normalize the ICAO code to uppercase before lookup.
pub trait AirportCatalog: Send + Sync {
    /// Look up an airport by ICAO identifier. `None` on a miss.
    fn info(&self, icao: &str) -> Option<AirportInfo>;
}

/// Catalog that knows nothing. Passes assembled against it carry no airport
/// back fields and no locations.
#[derive(Debug, Default)]
pub struct NullCatalog;

impl AirportCatalog for NullCatalog {
    fn info(&self, _icao: &str) -> Option<AirportInfo> {
        None
    }
}

/// In-memory catalog over a fixed set of airports.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    airports: HashMap<String, AirportInfo>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an airport, keyed by its uppercased `ident`.
    pub fn insert(&mut self, info: AirportInfo) {
        self.airports.insert(info.ident.to_uppercase(), info);
    }
}

impl AirportCatalog for StaticCatalog {
    fn info(&self, icao: &str) -> Option<AirportInfo> {
        self.airports.get(&icao.to_uppercase()).cloned()
    }
}

/// Pick a primary-field label for an airport within a length budget.
///
/// Prefers the full airport name if it fits under `max_len`, then the
/// municipality, then falls back to the full name regardless (truncation is
/// the renderer's problem). Without any reference data the ICAO code itself
/// is the label.
pub fn fit_name(icao: &str, info: Option<&AirportInfo>, max_len: usize) -> String {
    let Some(info) = info else {
        return icao.to_string();
    };
    let name = info.name.as_deref().filter(|n| !n.is_empty());
    let city = info.municipality.as_deref().filter(|c| !c.is_empty());
    match (name, city) {
        (Some(name), _) if name.len() < max_len => name.to_string(),
        (_, Some(city)) if city.len() < max_len => city.to_string(),
        (Some(name), _) => name.to_string(),
        (None, Some(city)) => city.to_string(),
        (None, None) => icao.to_string(),
    }
}
