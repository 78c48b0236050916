//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults (`ClientConfig::default()`)
//! 2. A TOML file: the path given to [`load_config`], or
//!    `<config dir>/folio/config.toml` if it exists
//! 3. `FOLIO_*` environment variables, with `__` between nested keys
//!    (`FOLIO_API_BASE_URL`, `FOLIO_RETRY__MAX_RETRIES`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use folio_application::ClientConfig;
use thiserror::Error;
use tracing::debug;
use url::Url;

const ENV_PREFIX: &str = "FOLIO";
const CONFIG_FILE: &str = "config.toml";

/// Errors while assembling the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// `api_base_url` is not an absolute URL.
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// Offending value.
        url: String,
        /// Parse failure.
        source: url::ParseError,
    },

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default location of the optional config file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join(CONFIG_FILE))
}

/// Loads the client configuration.
///
/// An explicit `path` must exist; the default file is optional.
///
/// # Errors
///
/// Returns an error if a source cannot be parsed or a value is invalid.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    build(path, None)
}

fn build(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<ClientConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&ClientConfig::default())?);

    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        None => {
            if let Some(default) = default_config_path() {
                builder = builder.add_source(File::from(default).format(FileFormat::Toml).required(false));
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: ClientConfig = builder.build()?.try_deserialize()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    Url::parse(&config.api_base_url).map_err(|source| ConfigError::InvalidBaseUrl {
        url: config.api_base_url.clone(),
        source,
    })?;
    if config.page_limit == 0 {
        return Err(ConfigError::Invalid("page_limit must be at least 1".to_string()));
    }
    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Invalid("request_timeout_ms must be at least 1".to_string()));
    }
    Ok(())
}
