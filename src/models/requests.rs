use serde::{Deserialize, Serialize};
use validator::Validate;

/// Position pushed by the browser's location provider
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Location acquisition failure reported by the browser
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationErrorRequest {
    #[validate(length(min = 1, max = 512))]
    pub message: String,
}

/// Mount a new map session, optionally with a known position
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[serde(default)]
    #[validate(nested)]
    pub location: Option<SetLocationRequest>,
}
