use crate::models::{Candidate, Coordinate, SearchQuery};
use crate::services::provider::{PlaceProvider, ProviderError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.geoapify.com";

const FALLBACK_NAME: &str = "Company";
const FALLBACK_ADDRESS: &str = "Address not available";

/// Geoapify place-search client
///
/// Handles both query modes used by discovery:
/// - Category search through the Places API
/// - Free-text search through the Geocoding API
pub struct GeoapifyClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeoapifyClient {
    /// Create a client pointed at the production Geoapify API
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, timeout_secs)
    }

    /// Create a client with a custom base URL (used against mock servers)
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn circle_filter(center: Coordinate, radius_meters: u32) -> String {
        // Geoapify wants lon,lat order
        format!("circle:{},{},{}", center.longitude, center.latitude, radius_meters)
    }

    fn category_url(&self, categories: &[String], center: Coordinate, radius_meters: u32, limit: u32) -> String {
        format!(
            "{}/v2/places?categories={}&filter={}&limit={}&apiKey={}",
            self.base_url,
            urlencoding::encode(&categories.join(",")),
            urlencoding::encode(&Self::circle_filter(center, radius_meters)),
            limit,
            urlencoding::encode(&self.api_key)
        )
    }

    fn text_url(&self, term: &str, center: Coordinate, radius_meters: u32, limit: u32) -> String {
        format!(
            "{}/v1/geocode/search?text={}&filter={}&limit={}&apiKey={}",
            self.base_url,
            urlencoding::encode(term),
            urlencoding::encode(&Self::circle_filter(center, radius_meters)),
            limit,
            urlencoding::encode(&self.api_key)
        )
    }

    fn redact(&self, url: &str) -> String {
        match url.rfind("apiKey=") {
            Some(idx) => format!("{}apiKey=***", &url[..idx]),
            None => url.to_string(),
        }
    }

    async fn fetch(&self, url: &str, query: SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        tracing::debug!("Querying Geoapify: {}", self.redact(url));

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(response.status().as_u16()));
        }

        let json: Value = response.json().await?;
        let candidates = parse_features(&json, &query)?;

        tracing::debug!("Query {} returned {} candidates", query.label(), candidates.len());

        Ok(candidates)
    }

    /// Category search that never fails; errors are logged and yield nothing
    pub async fn search_by_category_or_empty(
        &self,
        categories: &[String],
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Vec<Candidate> {
        let query = SearchQuery::category(categories.to_vec(), center, radius_meters, limit);
        crate::services::provider::execute_or_empty(self, &query).await
    }

    /// Text search that never fails; errors are logged and yield nothing
    pub async fn search_by_text_or_empty(
        &self,
        term: &str,
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Vec<Candidate> {
        let query = SearchQuery::text(term, center, radius_meters, limit);
        crate::services::provider::execute_or_empty(self, &query).await
    }
}

impl PlaceProvider for GeoapifyClient {
    async fn search_by_category(
        &self,
        categories: &[String],
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.category_url(categories, center, radius_meters, limit);
        let query = SearchQuery::category(categories.to_vec(), center, radius_meters, limit);
        self.fetch(&url, query).await
    }

    async fn search_by_text(
        &self,
        term: &str,
        center: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.text_url(term, center, radius_meters, limit);
        let query = SearchQuery::text(term, center, radius_meters, limit);
        self.fetch(&url, query).await
    }
}

/// Map a GeoJSON feature collection into candidates
///
/// A body without a `features` array is an error. Individual features with a
/// missing or invalid geometry are skipped.
pub fn parse_features(json: &Value, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
    let features = json
        .get("features")
        .and_then(|f| f.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Missing features array".into()))?;

    let candidates = features
        .iter()
        .filter_map(|feature| parse_feature(feature, query))
        .collect();

    Ok(candidates)
}

fn parse_feature(feature: &Value, query: &SearchQuery) -> Option<Candidate> {
    let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    let coordinate = Coordinate::new(lat, lon).ok()?;

    let empty = Value::Null;
    let properties = feature.get("properties").unwrap_or(&empty);

    Some(Candidate {
        coordinate,
        name: display_name(properties),
        address: display_address(properties),
        source_query: query.clone(),
    })
}

/// Non-empty string property
fn text_prop<'a>(properties: &'a Value, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// name -> address_line1 -> first segment of formatted -> "Company"
pub fn display_name(properties: &Value) -> String {
    text_prop(properties, "name")
        .or_else(|| text_prop(properties, "address_line1"))
        .or_else(|| {
            text_prop(properties, "formatted")
                .and_then(|f| f.split(',').next())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

/// address_line2 -> formatted -> "Address not available"
pub fn display_address(properties: &Value) -> String {
    text_prop(properties, "address_line2")
        .or_else(|| text_prop(properties, "formatted"))
        .unwrap_or(FALLBACK_ADDRESS)
        .to_string()
}
