// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, Coordinate, CoordinateError, DiscoveryConfig, DiscoveryPhase, DiscoveryResult,
    DiscoveryStatus, Marker, MarkerKind, MarkerPopup, Notice, QueryMode, Region, SearchQuery,
};
pub use requests::{CreateSessionRequest, LocationErrorRequest, SetLocationRequest};
pub use responses::{DiscoveryResponse, ErrorResponse, HealthResponse, MapFrame, SessionResponse};
