// Service exports
pub mod geoapify;
pub mod provider;
pub mod sessions;
pub mod surface;

pub use geoapify::GeoapifyClient;
pub use provider::{PlaceProvider, ProviderError};
pub use sessions::{Session, SessionError, SessionRegistry};
pub use surface::{InMemorySurface, MapSurface};
