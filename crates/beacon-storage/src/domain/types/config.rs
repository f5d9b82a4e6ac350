//! # Storage Configuration
//!
//! All values have defaults suitable for a production deployment against a
//! dedicated namespace. Development and Test modes switch to their own
//! isolated namespaces and flush them on startup.

use std::time::Duration;
use thiserror::Error;

/// Namespace used by development mode (matches the legacy dev database).
pub const DEFAULT_DEV_NAMESPACE: u32 = 11;
/// Namespace used by test mode.
pub const DEFAULT_TEST_NAMESPACE: u32 = 12;

/// Deployment mode of the storage facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Production,
    /// Isolated namespace, flushed and seeded with fixture data on startup.
    Development,
    /// Isolated namespace, flushed on startup.
    Test,
}

impl StorageMode {
    /// Development and Test modes skip secret comparison in `authenticate`.
    pub const fn bypasses_auth(&self) -> bool {
        !matches!(self, StorageMode::Production)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(StorageMode::Production),
            "development" | "dev" => Some(StorageMode::Development),
            "test" => Some(StorageMode::Test),
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Integer radix must be within 2..=36, got {0}")]
    InvalidRadix(u32),

    #[error("Post TTL must be at least one second")]
    ZeroTtl,
}

/// Configuration for the storage facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub mode: StorageMode,

    /// Namespace selected in Production mode (default: 0).
    pub namespace: u32,

    /// Namespace selected in Development mode (default: 11).
    pub dev_namespace: u32,

    /// Namespace selected in Test mode (default: 12).
    pub test_namespace: u32,

    /// Radix for ID-valued hash fields and comment-list entries
    /// (default: 10). Counter fields stay decimal because the store
    /// increments them in place.
    pub int_radix: u32,

    /// Finite lifetime of post records. `None` keeps them forever.
    pub post_ttl: Option<Duration>,

    /// Whether Development mode seeds fixture data (default: true).
    pub seed_fixtures: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::Production,
            namespace: 0,
            dev_namespace: DEFAULT_DEV_NAMESPACE,
            test_namespace: DEFAULT_TEST_NAMESPACE,
            int_radix: 10,
            post_ttl: None,
            seed_fixtures: true,
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Development mode with fixture seeding.
    pub fn development() -> Self {
        Self::default().with_mode(StorageMode::Development)
    }

    /// Test mode: isolated, flushed, no fixtures.
    pub fn test() -> Self {
        Self::default().with_mode(StorageMode::Test)
    }

    pub fn with_mode(mut self, mode: StorageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_namespace(mut self, namespace: u32) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_int_radix(mut self, radix: u32) -> Self {
        self.int_radix = radix;
        self
    }

    pub fn with_post_ttl(mut self, ttl: Duration) -> Self {
        self.post_ttl = Some(ttl);
        self
    }

    pub fn with_seed_fixtures(mut self, seed: bool) -> Self {
        self.seed_fixtures = seed;
        self
    }

    /// The namespace this configuration selects on startup.
    pub fn active_namespace(&self) -> u32 {
        match self.mode {
            StorageMode::Production => self.namespace,
            StorageMode::Development => self.dev_namespace,
            StorageMode::Test => self.test_namespace,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=36).contains(&self.int_radix) {
            return Err(ConfigError::InvalidRadix(self.int_radix));
        }
        if matches!(self.post_ttl, Some(ttl) if ttl.as_secs() == 0) {
            return Err(ConfigError::ZeroTtl);
        }
        Ok(())
    }

    /// Load configuration from `BEACON_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Recognized keys: `BEACON_MODE`, `BEACON_NAMESPACE`,
    /// `BEACON_INT_RADIX`, `BEACON_POST_TTL_SECS`. Unparsable values are
    /// ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("BEACON_MODE") {
            match StorageMode::parse(&raw) {
                Some(mode) => config.mode = mode,
                None => warn_unparsable("BEACON_MODE", &raw),
            }
        }
        if let Some(raw) = lookup("BEACON_NAMESPACE") {
            match raw.trim().parse() {
                Ok(namespace) => config.namespace = namespace,
                Err(_) => warn_unparsable("BEACON_NAMESPACE", &raw),
            }
        }
        if let Some(raw) = lookup("BEACON_INT_RADIX") {
            match raw.trim().parse() {
                Ok(radix) => config.int_radix = radix,
                Err(_) => warn_unparsable("BEACON_INT_RADIX", &raw),
            }
        }
        if let Some(raw) = lookup("BEACON_POST_TTL_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.post_ttl = None,
                Ok(secs) => config.post_ttl = Some(Duration::from_secs(secs)),
                Err(_) => warn_unparsable("BEACON_POST_TTL_SECS", &raw),
            }
        }

        config
    }
}

#[allow(unused_variables)]
fn warn_unparsable(key: &str, raw: &str) {
    #[cfg(feature = "tracing-log")]
    tracing::warn!("[beacon-storage] ignoring unparsable {}={:?}", key, raw);
}
