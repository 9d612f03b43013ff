use crate::api::StorageError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Fixed API host
pub const DEFAULT_BASE_URL: &str = "https://api.objstore.io";

const CREDENTIALS_REQUIRED: &str = "Access key and secret key are required.";

/// Client configuration, immutable once built
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    access_key: String,
    secret_key: String,
    base_url: String,
    region: Option<String>,
    default_bucket: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field("default_bucket", &self.default_bucket)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration. Both keys must be non-empty.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> std::result::Result<Self, StorageError> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.is_empty() || secret_key.is_empty() {
            return Err(StorageError::Configuration(CREDENTIALS_REQUIRED.to_string()));
        }

        Ok(Self {
            access_key,
            secret_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            region: None,
            default_bucket: None,
        })
    }

    /// Set the default region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(region.into());
        self
    }

    /// Set the bucket used when an operation names none
    pub fn with_default_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.default_bucket = non_empty(bucket.into());
        self
    }

    /// Point the client at another host (staging, local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// On-disk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Access key (required)
    #[serde(default)]
    pub access_key: String,

    /// Secret key (required)
    #[serde(default)]
    pub secret_key: String,

    /// Default region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Default bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// API host override
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Profile {
    /// Validate and convert into a client configuration
    pub fn into_client_config(self) -> std::result::Result<ClientConfig, StorageError> {
        let mut config =
            ClientConfig::new(self.access_key, self.secret_key)?.with_base_url(self.base_url);
        if let Some(region) = self.region {
            config = config.with_region(region);
        }
        if let Some(bucket) = self.bucket {
            config = config.with_default_bucket(bucket);
        }
        Ok(config)
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let profile: Profile =
        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

    let config = profile
        .into_client_config()
        .context("Invalid client configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - OBJSTORE_ACCESS_KEY (required)
/// - OBJSTORE_SECRET_KEY (required)
/// - OBJSTORE_REGION (optional)
/// - OBJSTORE_BUCKET (optional)
/// - OBJSTORE_BASE_URL (optional, defaults to the public API host)
pub fn load_from_env() -> Result<ClientConfig> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let access_key = std::env::var("OBJSTORE_ACCESS_KEY")
        .context("OBJSTORE_ACCESS_KEY environment variable not set")?;

    let secret_key = std::env::var("OBJSTORE_SECRET_KEY")
        .context("OBJSTORE_SECRET_KEY environment variable not set")?;

    let profile = Profile {
        access_key,
        secret_key,
        region: std::env::var("OBJSTORE_REGION").ok(),
        bucket: std::env::var("OBJSTORE_BUCKET").ok(),
        base_url: std::env::var("OBJSTORE_BASE_URL").unwrap_or_else(|_| default_base_url()),
    };

    profile
        .into_client_config()
        .context("Invalid client configuration")
}

/// Load configuration from a YAML file when a path is given, else from the environment
pub fn load_config(config_path: Option<&str>) -> Result<ClientConfig> {
    match config_path {
        Some(path) => load_from_yaml(path),
        None => load_from_env(),
    }
}
