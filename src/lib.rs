//! Nearby Scout - discovery of companies around a user's position
//!
//! Queries a place-search provider in several modes, merges the results into
//! one deduplicated candidate set, filters out roadway noise and computes the
//! region a map should fit to show them.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{CandidateSet, DiscoveryError, DiscoveryOrchestrator, LocationProvider, bounding_region};
pub use models::{Candidate, Coordinate, DiscoveryConfig, DiscoveryResult, DiscoveryStatus, Region, SearchQuery};
pub use services::{GeoapifyClient, InMemorySurface, MapSurface, PlaceProvider, ProviderError};
