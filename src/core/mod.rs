// Core algorithm exports
pub mod orchestrator;
pub mod reconciler;
pub mod region;

pub use orchestrator::{
    DiscoveryError, DiscoveryOrchestrator, FixedLocation, LocationError, LocationProvider,
};
pub use reconciler::{is_duplicate, is_noise, CandidateSet};
pub use region::bounding_region;
