use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use crate::models::domain::{DiscoveryConfig, DEFAULT_CATEGORIES, DEFAULT_SYNONYMS};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub api_key: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_timeout() -> u64 { 8 }

/// Discovery tunables
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_search_radius")]
    pub search_radius_meters: u32,
    #[serde(default = "default_category_limit")]
    pub category_limit: u32,
    #[serde(default = "default_text_query_limit")]
    pub text_query_limit: u32,
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,
    #[serde(default = "default_proximity_tolerance")]
    pub proximity_tolerance_degrees: f64,
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    #[serde(default = "default_region_padding")]
    pub region_padding_px: u32,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_synonyms")]
    pub synonyms: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            search_radius_meters: default_search_radius(),
            category_limit: default_category_limit(),
            text_query_limit: default_text_query_limit(),
            result_cap: default_result_cap(),
            proximity_tolerance_degrees: default_proximity_tolerance(),
            query_timeout_secs: default_query_timeout(),
            region_padding_px: default_region_padding(),
            categories: default_categories(),
            synonyms: default_synonyms(),
        }
    }
}

impl From<DiscoverySettings> for DiscoveryConfig {
    fn from(settings: DiscoverySettings) -> Self {
        Self {
            search_radius_meters: settings.search_radius_meters,
            category_limit: settings.category_limit,
            text_query_limit: settings.text_query_limit,
            result_cap: settings.result_cap,
            proximity_tolerance_degrees: settings.proximity_tolerance_degrees,
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
            region_padding_px: settings.region_padding_px,
            categories: settings.categories,
            synonyms: settings.synonyms,
        }
    }
}

fn default_search_radius() -> u32 { 10_000 }
fn default_category_limit() -> u32 { 50 }
fn default_text_query_limit() -> u32 { 10 }
fn default_result_cap() -> usize { 30 }
fn default_proximity_tolerance() -> f64 { 0.0001 }
fn default_query_timeout() -> u64 { 8 }
fn default_region_padding() -> u32 { 50 }
fn default_categories() -> Vec<String> { DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect() }
fn default_synonyms() -> Vec<String> { DEFAULT_SYNONYMS.iter().map(|s| s.to_string()).collect() }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_max_sessions() -> u64 { 10_000 }
fn default_idle_timeout() -> u64 { 1800 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCOUT_)
    /// 5. GEOAPIFY_API_KEY, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCOUT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_api_key_override(settings)?.try_deserialize()
    }
}

/// Let the conventional GEOAPIFY_API_KEY variable supply the provider key
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("GEOAPIFY_API_KEY") {
        Ok(key) if !key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("provider.api_key", key)?
            .build(),
        _ => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_discovery() {
        let config: DiscoveryConfig = DiscoverySettings::default().into();
        assert_eq!(config, DiscoveryConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [provider]
            api_key = "abc"

            [discovery]
            result_cap = 12
            synonyms = ["software house"]
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.provider.timeout_secs, 8);
        assert_eq!(settings.discovery.result_cap, 12);
        assert_eq!(settings.discovery.search_radius_meters, 10_000);
        assert_eq!(settings.discovery.synonyms, vec!["software house"]);
        assert_eq!(settings.sessions.idle_timeout_secs, 1800);
        assert_eq!(settings.logging.format, "json");
    }
}
