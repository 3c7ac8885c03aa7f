use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::domain::{Coordinate, DiscoveryPhase, DiscoveryResult, Marker, Notice, Region};

/// Response for the discover endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub result: DiscoveryResult,
    pub count: usize,
    pub message: String,
}

/// Session state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub phase: DiscoveryPhase,
    pub location: Option<Coordinate>,
    #[serde(rename = "lastResult")]
    pub last_result: Option<DiscoveryResult>,
}

/// What the map surface currently shows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapFrame {
    #[serde(rename = "locationMarker")]
    pub location_marker: Option<Marker>,
    pub markers: Vec<Marker>,
    pub viewport: Option<Region>,
    pub notice: Option<Notice>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "activeSessions")]
    pub active_sessions: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
