use crate::models::{Candidate, Coordinate, QueryMode, SearchQuery};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when querying a place provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    ApiError(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Provider did not answer within {0} ms")]
    Timeout(u128),
}

/// A remote place-search service
///
/// Implementations only map provider responses into candidates. They do not
/// deduplicate or filter.
#[allow(async_fn_in_trait)]
pub trait PlaceProvider {
    async fn search_by_category(
        &self,
        categories: &[String],
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError>;

    async fn search_by_text(
        &self,
        term: &str,
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError>;
}

impl<P: PlaceProvider> PlaceProvider for Arc<P> {
    async fn search_by_category(
        &self,
        categories: &[String],
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search_by_category(categories, center, radius_meters, limit).await
    }

    async fn search_by_text(
        &self,
        term: &str,
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search_by_text(term, center, radius_meters, limit).await
    }
}

/// Run a query through the provider
pub async fn execute<P: PlaceProvider>(
    provider: &P,
    query: &SearchQuery,
) -> Result<Vec<Candidate>, ProviderError> {
    match &query.mode {
        QueryMode::Category { categories } => {
            provider
                .search_by_category(categories, query.center, query.radius_meters, query.limit)
                .await
        }
        QueryMode::Text { term } => {
            provider
                .search_by_text(term, query.center, query.radius_meters, query.limit)
                .await
        }
    }
}

/// Treat a failed query as zero candidates
///
/// Provider failures never abort a discovery run; they are logged and
/// contribute nothing.
pub fn or_empty(query: &SearchQuery, result: Result<Vec<Candidate>, ProviderError>) -> Vec<Candidate> {
    match result {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!("Query {} failed, treating as empty: {}", query.label(), e);
            Vec::new()
        }
    }
}

/// Run a query, recovering any failure as zero candidates
pub async fn execute_or_empty<P: PlaceProvider>(provider: &P, query: &SearchQuery) -> Vec<Candidate> {
    or_empty(query, execute(provider, query).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_becomes_empty() {
        let center = Coordinate { latitude: 33.6844, longitude: 73.0479 };
        let query = SearchQuery::text("IT company", center, 10_000, 10);

        let recovered = or_empty(&query, Err(ProviderError::ApiError(502)));
        assert!(recovered.is_empty());

        let recovered = or_empty(&query, Err(ProviderError::InvalidResponse("no features".into())));
        assert!(recovered.is_empty());
    }
}
