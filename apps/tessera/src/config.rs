//! # Configuration
//!
//! Two pieces of configuration are resolved once at startup:
//!
//! - the record [`Schema`], from TOML
//! - the HTTP [`ApiConfig`], from `TESSERA_*` environment variables
//!
//! Schema lookup order:
//! 1. `--schema <path>` on the command line
//! 2. `TESSERA_SCHEMA` environment variable
//! 3. Built-in defaults
//!
//! Keys missing from the file keep their default value, so a file may
//! override only what differs:
//!
//! ```toml
//! [tags]
//! concept = "concept_of_instance"
//! relation = "relation_value"
//! metadata = "meta_data"
//! ```

use std::path::{Path, PathBuf};
use tessera_core::{Schema, TesseraError};

/// Environment variable naming a schema file.
pub const SCHEMA_ENV: &str = "TESSERA_SCHEMA";

/// Environment variable holding the API key. Unset or empty disables auth.
pub const API_KEY_ENV: &str = "TESSERA_API_KEY";

/// Environment variable holding the request rate limit. `0` disables it.
pub const RATE_LIMIT_ENV: &str = "TESSERA_RATE_LIMIT";

/// Environment variable holding allowed CORS origins: `*` or a
/// comma-separated list.
pub const CORS_ORIGINS_ENV: &str = "TESSERA_CORS_ORIGINS";

/// Requests per second when `TESSERA_RATE_LIMIT` is unset.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum schema file size (1 MB).
const MAX_SCHEMA_FILE_SIZE: u64 = 1024 * 1024;

/// Parse and validate a schema from TOML text.
pub fn schema_from_toml(text: &str) -> Result<Schema, TesseraError> {
    let schema: Schema =
        toml::from_str(text).map_err(|e| TesseraError::ConfigError(e.to_string()))?;
    schema.validate()?;
    Ok(schema)
}

/// Resolve which schema file to use, if any.
pub fn resolve_schema_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(SCHEMA_ENV).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty())
}

/// Load the schema per the lookup order above.
pub fn load_schema(explicit: Option<&Path>) -> Result<Schema, TesseraError> {
    let Some(path) = resolve_schema_path(explicit) else {
        tracing::debug!("no schema file configured, using defaults");
        return Ok(Schema::default());
    };

    let metadata = std::fs::metadata(&path).map_err(|e| {
        TesseraError::ConfigError(format!("Cannot read schema '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_SCHEMA_FILE_SIZE {
        return Err(TesseraError::ConfigError(format!(
            "Schema file size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_SCHEMA_FILE_SIZE
        )));
    }

    let text = std::fs::read_to_string(&path).map_err(|e| {
        TesseraError::ConfigError(format!("Cannot read schema '{}': {}", path.display(), e))
    })?;
    let schema = schema_from_toml(&text)?;
    tracing::info!(path = %path.display(), "schema loaded");
    Ok(schema)
}

// =============================================================================
// HTTP API CONFIGURATION
// =============================================================================

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `http://localhost` and `http://127.0.0.1` on ports 3000 and 8080.
    #[default]
    Localhost,
    /// Any origin.
    Any,
    /// An explicit list of `http(s)://` origins.
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse `*` or a comma-separated origin list.
    pub fn parse(raw: &str) -> Result<Self, TesseraError> {
        if raw.trim() == "*" {
            return Ok(Self::Any);
        }

        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(bad) = origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(TesseraError::ConfigError(format!(
                "{}: origin '{}' must start with http:// or https://",
                CORS_ORIGINS_ENV, bad
            )));
        }
        if origins.is_empty() {
            return Err(TesseraError::ConfigError(format!(
                "{} lists no origins",
                CORS_ORIGINS_ENV
            )));
        }
        Ok(Self::List(origins))
    }
}

/// Settings for the read-only HTTP API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Bearer key required on every route except `/health`.
    pub api_key: Option<String>,
    /// Requests per second across all clients; `0` disables limiting.
    pub rate_limit: u32,
    pub cors_origins: CorsOrigins,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: CorsOrigins::default(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit", &self.rate_limit)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl ApiConfig {
    /// Read the `TESSERA_*` environment variables.
    pub fn from_env() -> Result<Self, TesseraError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Unset variables keep their defaults;
    /// set but invalid ones are a `ConfigError`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TesseraError> {
        let api_key = lookup(API_KEY_ENV).filter(|key| !key.is_empty());

        let rate_limit = match lookup(RATE_LIMIT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                TesseraError::ConfigError(format!(
                    "{} must be a non-negative integer, got {:?}",
                    RATE_LIMIT_ENV, raw
                ))
            })?,
            None => DEFAULT_RATE_LIMIT,
        };

        let cors_origins = match lookup(CORS_ORIGINS_ENV) {
            Some(raw) => CorsOrigins::parse(&raw)?,
            None => CorsOrigins::default(),
        };

        Ok(Self {
            api_key,
            rate_limit,
            cors_origins,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
