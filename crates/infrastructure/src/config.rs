//! Scheme options loading.
//!
//! Options are read from a YAML or JSON file, chosen by extension, and
//! validated before use: domain rules first, then endpoint URLs.

use std::path::{Path, PathBuf};

use sessionkit_domain::{DomainError, SchemeConfig};
use tracing::debug;
use url::Url;

/// Supported option file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detects the format from the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Errors raised while loading scheme options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Options file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a supported format.
    #[error("unsupported options file: {0}")]
    UnsupportedFormat(PathBuf),

    /// YAML parsing failed.
    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failed.
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint URL is not absolute.
    #[error("invalid {field} URL '{url}': {source}")]
    InvalidUrl {
        /// Option holding the URL.
        field: &'static str,
        /// Offending value.
        url: String,
        /// Parse error.
        #[source]
        source: url::ParseError,
    },

    /// The options violate a domain rule.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Reads and validates scheme options from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, fails to parse, or holds invalid options.
pub fn load_scheme_config(path: impl AsRef<Path>) -> Result<SchemeConfig, ConfigError> {
    let path = path.as_ref();
    let format =
        ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_scheme_config(&content, format)?;
    debug!(path = %path.display(), scheme = %config.name, "scheme options loaded");
    Ok(config)
}

/// Parses and validates scheme options. Missing fields take their defaults.
///
/// # Errors
///
/// Returns an error if `content` fails to parse or holds invalid options.
pub fn parse_scheme_config(content: &str, format: ConfigFormat) -> Result<SchemeConfig, ConfigError> {
    let config: SchemeConfig = match format {
        ConfigFormat::Yaml if content.trim().is_empty() => SchemeConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };

    config.validate()?;
    validate_endpoints(&config)?;
    Ok(config)
}

fn validate_endpoints(config: &SchemeConfig) -> Result<(), ConfigError> {
    let endpoints = [
        ("endpoints.token", config.endpoints.token.as_ref()),
        ("endpoints.user", config.endpoints.user.as_ref()),
    ];

    for (field, endpoint) in endpoints
        .into_iter()
        .filter_map(|(field, endpoint)| Some((field, endpoint?)))
    {
        Url::parse(&endpoint.url).map_err(|source| ConfigError::InvalidUrl {
            field,
            url: endpoint.url.clone(),
            source,
        })?;
    }

    Ok(())
}
