use crate::core::reconciler::CandidateSet;
use crate::core::region::bounding_region;
use crate::models::{
    Candidate, Coordinate, CoordinateError, DiscoveryConfig, DiscoveryPhase, DiscoveryResult,
    DiscoveryStatus, Marker, Notice, SearchQuery,
};
use crate::services::provider::{self, PlaceProvider, ProviderError};
use crate::services::surface::MapSurface;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Errors returned to the caller of the orchestrator
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Discovery was requested before any location arrived
    #[error("location unavailable")]
    LocationUnavailable,

    #[error("location acquisition failed: {0}")]
    LocationAcquisition(String),

    /// A newer run replaced this one before it finished
    #[error("discovery superseded by a newer run")]
    Superseded,

    /// The run died before it could finish, e.g. a panic inside a provider
    #[error("discovery aborted: {0}")]
    Aborted(String),
}

impl DiscoveryError {
    /// Notice shown to the user for this failure; a superseded run shows nothing
    pub fn notice(&self) -> Option<Notice> {
        match self {
            DiscoveryError::LocationUnavailable => Some(Notice::LocationUnavailable),
            DiscoveryError::LocationAcquisition(reason) => Some(Notice::LocationFailed(reason.clone())),
            DiscoveryError::Superseded => None,
            DiscoveryError::Aborted(_) => Some(Notice::SearchFailed),
        }
    }
}

/// Errors reported by a location source
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    InvalidPosition(#[from] CoordinateError),
}

/// One-shot source of the user's position
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Location known up front, e.g. sent along when the map mounts
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug)]
struct OrchestratorState {
    phase: DiscoveryPhase,
    location: Option<Coordinate>,
    owned_markers: Vec<Uuid>,
    last_result: Option<DiscoveryResult>,
    current_run: Option<CancellationToken>,
}

impl OrchestratorState {
    fn with_phase(phase: DiscoveryPhase) -> Self {
        Self {
            phase,
            location: None,
            owned_markers: Vec::new(),
            last_result: None,
            current_run: None,
        }
    }
}

/// Owns the end-to-end discovery workflow for one map
///
/// # Workflow
/// 1. One category query over the configured categories
/// 2. Text queries per synonym, in order, until the merged set saturates
/// 3. Noise filter over the accumulated set
/// 4. Bounding region for the survivors
///
/// Queries are strictly sequential because each saturation check depends on
/// everything merged before it. A new run cancels the one in flight.
pub struct DiscoveryOrchestrator<P, M> {
    provider: P,
    surface: M,
    config: DiscoveryConfig,
    state: Mutex<OrchestratorState>,
}

impl<P: PlaceProvider, M: MapSurface> DiscoveryOrchestrator<P, M> {
    /// Mount an orchestrator; it waits for a location before anything else
    pub fn new(provider: P, surface: M, config: DiscoveryConfig) -> Self {
        Self {
            provider,
            surface,
            config,
            state: Mutex::new(OrchestratorState::with_phase(DiscoveryPhase::AwaitingLocation)),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub async fn phase(&self) -> DiscoveryPhase {
        self.state.lock().await.phase.clone()
    }

    pub async fn location(&self) -> Option<Coordinate> {
        self.state.lock().await.location
    }

    pub async fn last_result(&self) -> Option<DiscoveryResult> {
        self.state.lock().await.last_result.clone()
    }

    /// Request the position once from a location source
    pub async fn acquire_location<L: LocationProvider>(&self, source: &L) -> Result<Coordinate, DiscoveryError> {
        match source.current_position().await {
            Ok(coordinate) => self.set_location(coordinate).await,
            Err(e) => {
                let reason = e.to_string();
                self.report_location_error(reason.clone()).await;
                Err(DiscoveryError::LocationAcquisition(reason))
            }
        }
    }

    /// Record the user's position
    ///
    /// The first position wins and places the persistent location marker.
    /// Later calls return the stored position unchanged. An out-of-range
    /// position is rejected and leaves the phase as it was.
    pub async fn set_location(&self, coordinate: Coordinate) -> Result<Coordinate, DiscoveryError> {
        let coordinate = Coordinate::new(coordinate.latitude, coordinate.longitude)
            .map_err(LocationError::from)
            .map_err(|e| {
                tracing::warn!("Rejected location: {}", e);
                DiscoveryError::LocationAcquisition(e.to_string())
            })?;

        let mut state = self.state.lock().await;

        if let Some(existing) = state.location {
            tracing::debug!("Location already captured, ignoring {:?}", coordinate);
            return Ok(existing);
        }

        let marker = Marker::user_location(coordinate);
        self.surface.show_user_location(&marker);

        state.location = Some(coordinate);
        if !matches!(state.phase, DiscoveryPhase::Searching | DiscoveryPhase::Completed(_)) {
            state.phase = DiscoveryPhase::Ready;
        }

        tracing::info!(
            "Location captured: {}, {}",
            coordinate.latitude,
            coordinate.longitude
        );

        Ok(coordinate)
    }

    /// Record that the location source could not produce a position
    pub async fn report_location_error(&self, reason: String) {
        let mut state = self.state.lock().await;

        if state.location.is_some() {
            tracing::warn!("Ignoring location error after location was captured: {}", reason);
            return;
        }

        tracing::warn!("Location acquisition failed: {}", reason);
        self.surface.notify(&Notice::LocationFailed(reason.clone()));
        state.phase = DiscoveryPhase::Failed(reason);
    }

    /// Run one discovery round around the captured location
    ///
    /// Supersedes any run still in flight: its queries are cancelled and it
    /// returns [`DiscoveryError::Superseded`] without touching state.
    pub async fn start_discovery(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let (center, token) = {
            let mut state = self.state.lock().await;

            let Some(center) = state.location else {
                self.surface.notify(&Notice::LocationUnavailable);
                return Err(DiscoveryError::LocationUnavailable);
            };

            if let Some(previous) = state.current_run.take() {
                tracing::info!("Cancelling in-flight discovery run");
                previous.cancel();
            }

            let stale = std::mem::take(&mut state.owned_markers);
            self.surface.remove_markers(&stale);

            let token = CancellationToken::new();
            state.current_run = Some(token.clone());
            state.last_result = None;
            state.phase = DiscoveryPhase::Searching;

            (center, token)
        };

        tracing::info!("Starting discovery around {}, {}", center.latitude, center.longitude);

        let gathered = self.gather(center, &token).await?;
        let merged = gathered.len();
        let candidates = gathered.apply_noise_filter().into_vec();
        let filtered_out = merged - candidates.len();

        tracing::debug!(
            "Noise filter kept {} of {} candidates",
            candidates.len(),
            merged
        );

        let region = bounding_region(&candidates, self.config.region_padding_px);
        let status = if candidates.is_empty() {
            DiscoveryStatus::Empty
        } else {
            DiscoveryStatus::Found
        };
        let result = DiscoveryResult {
            candidates,
            region,
            status,
            filtered_out,
        };

        let mut state = self.state.lock().await;
        if token.is_cancelled() {
            return Err(DiscoveryError::Superseded);
        }
        state.current_run = None;

        let markers: Vec<Marker> = result.candidates.iter().map(Marker::place).collect();
        self.surface.add_markers(&markers);
        state.owned_markers = markers.iter().map(|m| m.id).collect();

        if let Some(region) = &result.region {
            self.surface.fit_region(region);
        }
        self.surface.notify(&result.notice(self.config.search_radius_meters));

        state.phase = DiscoveryPhase::Completed(result.status);
        state.last_result = Some(result.clone());

        tracing::info!("Discovery finished with {} candidates", result.count());

        Ok(result)
    }

    /// Unmount: cancel any run and clear everything drawn
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if let Some(run) = state.current_run.take() {
            run.cancel();
        }
        self.surface.clear();
        *state = OrchestratorState::with_phase(DiscoveryPhase::Idle);
    }

    async fn gather(&self, center: Coordinate, token: &CancellationToken) -> Result<CandidateSet, DiscoveryError> {
        let cfg = &self.config;
        let mut set = CandidateSet::new(cfg.proximity_tolerance_degrees);

        let query = SearchQuery::category(
            cfg.categories.clone(),
            center,
            cfg.search_radius_meters,
            cfg.category_limit,
        );
        let added = set.merge(self.run_query(&query, token).await?);
        tracing::debug!("Category query added {} candidates", added);

        for term in &cfg.synonyms {
            if set.is_saturated(cfg.result_cap) {
                tracing::info!(
                    "Saturated at {} candidates, skipping remaining text queries",
                    set.len()
                );
                break;
            }

            let query = SearchQuery::text(term.clone(), center, cfg.search_radius_meters, cfg.text_query_limit);
            let added = set.merge(self.run_query(&query, token).await?);
            tracing::debug!("Text query '{}' added {} candidates", term, added);
        }

        Ok(set)
    }

    /// Issue one query, bounded by the per-call timeout and the run's token
    async fn run_query(&self, query: &SearchQuery, token: &CancellationToken) -> Result<Vec<Candidate>, DiscoveryError> {
        let timeout = self.config.query_timeout;

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(DiscoveryError::Superseded),
            outcome = tokio::time::timeout(timeout, provider::execute(&self.provider, query)) => {
                let result = outcome.unwrap_or_else(|_| Err(ProviderError::Timeout(timeout.as_millis())));
                Ok(provider::or_empty(query, result))
            }
        }
    }
}
