//! Item store configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which backing table implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Amazon DynamoDB (or any endpoint speaking its protocol).
    #[default]
    DynamoDb,
    /// In-process table, for local development.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::invalid("ITEMS_BACKEND", s)),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_owned(),
        }
    }
}

/// Item store service configuration.
#[derive(Debug, Clone)]
pub struct ItemStoreConfig {
    /// Backing table implementation.
    pub backend: StoreBackend,
    /// Backing table name.
    pub table_name: String,
    /// Requested items per scan page; `None` lets the store decide.
    pub scan_page_size: Option<u32>,
    /// Upper bound on scan pages fetched by one enumeration.
    pub max_scan_pages: usize,
    /// Deadline for a single store operation, pagination included.
    pub request_timeout: Duration,
    /// CORS origin echoed on every response.
    pub allowed_origin: String,
    /// Resource path segment, also used for `Location` headers.
    pub resource_path: String,
    /// Endpoint override for DynamoDB (e.g. DynamoDB Local).
    pub dynamodb_endpoint_url: Option<String>,
}

impl Default for ItemStoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            table_name: "items".to_owned(),
            scan_page_size: None,
            max_scan_pages: 10_000,
            request_timeout: Duration::from_secs(10),
            allowed_origin: "*".to_owned(),
            resource_path: "items".to_owned(),
            dynamodb_endpoint_url: None,
        }
    }
}

impl ItemStoreConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("ITEMS_BACKEND") {
            config.backend = v.parse()?;
        }
        if let Some(v) = lookup("ITEMS_TABLE_NAME") {
            config.table_name = v;
        }
        if let Some(v) = lookup("ITEMS_SCAN_PAGE_SIZE") {
            config.scan_page_size = Some(parse_positive("ITEMS_SCAN_PAGE_SIZE", &v)?);
        }
        if let Some(v) = lookup("ITEMS_MAX_SCAN_PAGES") {
            config.max_scan_pages = parse_positive("ITEMS_MAX_SCAN_PAGES", &v)?;
        }
        if let Some(v) = lookup("ITEMS_REQUEST_TIMEOUT_MS") {
            let ms: u64 = parse_positive("ITEMS_REQUEST_TIMEOUT_MS", &v)?;
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = lookup("ITEMS_ALLOWED_ORIGIN") {
            config.allowed_origin = v;
        }
        if let Some(v) = lookup("ITEMS_RESOURCE_PATH") {
            config.resource_path = v.trim_matches('/').to_owned();
        }
        config.dynamodb_endpoint_url = lookup("DYNAMODB_ENDPOINT_URL").filter(|v| !v.is_empty());

        Ok(config)
    }
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::invalid(key, value)),
    }
}
