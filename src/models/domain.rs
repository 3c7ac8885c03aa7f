use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when building a coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Coordinate out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let in_range = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(CoordinateError::OutOfRange { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

/// How a provider query selects places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QueryMode {
    Category { categories: Vec<String> },
    Text { term: String },
}

/// A single provider query issued during one discovery round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub mode: QueryMode,
    pub center: Coordinate,
    #[serde(rename = "radiusMeters")]
    pub radius_meters: u32,
    pub limit: u32,
}

impl SearchQuery {
    pub fn category(categories: Vec<String>, center: Coordinate, radius_meters: u32, limit: u32) -> Self {
        Self {
            mode: QueryMode::Category { categories },
            center,
            radius_meters,
            limit,
        }
    }

    pub fn text(term: impl Into<String>, center: Coordinate, radius_meters: u32, limit: u32) -> Self {
        Self {
            mode: QueryMode::Text { term: term.into() },
            center,
            radius_meters,
            limit,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        match &self.mode {
            QueryMode::Category { categories } => format!("categories={}", categories.join(",")),
            QueryMode::Text { term } => format!("text={}", term),
        }
    }
}

/// A discovered place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub coordinate: Coordinate,
    pub name: String,
    pub address: String,
    #[serde(rename = "sourceQuery")]
    pub source_query: SearchQuery,
}

/// Minimal rectangle around the final candidates, plus the display margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "minLat")]
    pub min_lat: f64,
    #[serde(rename = "maxLat")]
    pub max_lat: f64,
    #[serde(rename = "minLon")]
    pub min_lon: f64,
    #[serde(rename = "maxLon")]
    pub max_lon: f64,
    #[serde(rename = "paddingPx")]
    pub padding_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStatus {
    Found,
    Empty,
}

/// Terminal output of one discovery run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub candidates: Vec<Candidate>,
    #[serde(rename = "boundingRegion")]
    pub region: Option<Region>,
    pub status: DiscoveryStatus,
    /// Merged candidates the noise filter removed
    #[serde(rename = "filteredOut")]
    pub filtered_out: usize,
}

impl DiscoveryResult {
    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    /// Notice describing this result for a search of `radius_meters`
    pub fn notice(&self, radius_meters: u32) -> Notice {
        if self.candidates.is_empty() {
            Notice::Empty {
                radius_meters,
                filtered: self.filtered_out > 0,
            }
        } else {
            Notice::Found(self.count())
        }
    }
}

/// Lifecycle of a discovery orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "detail", rename_all = "camelCase")]
pub enum DiscoveryPhase {
    Idle,
    AwaitingLocation,
    /// Location known, no run started yet
    Ready,
    Searching,
    Completed(DiscoveryStatus),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    UserLocation,
    Place,
}

/// Popup content attached to a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPopup {
    pub name: String,
    pub address: String,
}

/// A marker handed to the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub kind: MarkerKind,
    pub coordinate: Coordinate,
    pub popup: MarkerPopup,
}

impl Marker {
    pub fn user_location(coordinate: Coordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MarkerKind::UserLocation,
            coordinate,
            popup: MarkerPopup {
                name: "Your Location".to_string(),
                address: String::new(),
            },
        }
    }

    pub fn place(candidate: &Candidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MarkerKind::Place,
            coordinate: candidate.coordinate,
            popup: MarkerPopup {
                name: candidate.name.clone(),
                address: candidate.address.clone(),
            },
        }
    }
}

/// User-facing notification emitted to the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Notice {
    Found(usize),
    /// `filtered` is set when results arrived but all of them were noise
    Empty { radius_meters: u32, filtered: bool },
    LocationUnavailable,
    LocationFailed(String),
    SearchFailed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Found(count) => format!("Found {} software houses nearby", count),
            Notice::Empty {
                radius_meters,
                filtered: true,
            } => format!(
                "No software houses found nearby within {} radius. Try a different location or check back later.",
                format_radius(*radius_meters)
            ),
            Notice::Empty {
                radius_meters,
                filtered: false,
            } => format!(
                "No software houses found nearby within {} radius. The area might not have registered tech companies in the database.",
                format_radius(*radius_meters)
            ),
            Notice::LocationUnavailable => {
                "Please allow location access to find nearby software houses".to_string()
            }
            Notice::LocationFailed(reason) => format!("Could not determine your location: {}", reason),
            Notice::SearchFailed => {
                "Failed to search for nearby companies. Please check your internet connection and try again."
                    .to_string()
            }
        }
    }
}

/// "10km", "2.5km", or "500m" below one kilometre
fn format_radius(meters: u32) -> String {
    if meters < 1000 {
        format!("{}m", meters)
    } else if meters % 1000 == 0 {
        format!("{}km", meters / 1000)
    } else {
        format!("{}km", f64::from(meters) / 1000.0)
    }
}

/// Tunables for a discovery run
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub search_radius_meters: u32,
    pub category_limit: u32,
    pub text_query_limit: u32,
    pub result_cap: usize,
    pub proximity_tolerance_degrees: f64,
    pub query_timeout: Duration,
    pub region_padding_px: u32,
    pub categories: Vec<String>,
    pub synonyms: Vec<String>,
}

pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "commercial.office.it",
    "commercial.office.company",
    "commercial.computer",
    "office.company",
    "commercial.office",
];

pub const DEFAULT_SYNONYMS: [&str; 6] = [
    "software house",
    "IT company",
    "software company",
    "tech company",
    "software development",
    "technology company",
];

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: 10_000,
            category_limit: 50,
            text_query_limit: 10,
            result_cap: 30,
            proximity_tolerance_degrees: 0.0001,
            query_timeout: Duration::from_secs(8),
            region_padding_px: 50,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            synonyms: DEFAULT_SYNONYMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
