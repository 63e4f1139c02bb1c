//! RON configuration file for one import target.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gdoc_engine::{FetchSettings, GoogleDocsClient, ImportTargets};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable read for the token when neither `access_token`
/// nor `access_token_env` is set.
pub const DEFAULT_TOKEN_ENV: &str = "GDOC_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("no access token: set `access_token` or the {0} environment variable")]
    MissingToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Used when no id is given on the command line.
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default = "default_docs_api_base_url")]
    pub docs_api_base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_env: Option<String>,
    /// Relative paths are taken from the config file's directory.
    pub repository_dir: PathBuf,
    pub language_code: String,
    pub document_content_type: String,
    pub image_content_type: String,
    pub document_parent_location: u64,
    pub image_parent_location: u64,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Overrides for the HTTP defaults; unset values keep them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub redirect_limit: Option<usize>,
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

fn default_docs_api_base_url() -> String {
    GoogleDocsClient::DEFAULT_BASE_URL.to_string()
}

impl ImportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        if self.repository_dir.is_relative() {
            self.repository_dir = base.join(&self.repository_dir);
        }
        if let Some(log_file) = self.log_file.as_mut() {
            if log_file.is_relative() {
                *log_file = base.join(&*log_file);
            }
        }
    }

    /// Literal `access_token` first, then the configured environment variable.
    pub fn access_token<F>(&self, lookup_env: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = self.access_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
        let var = self.access_token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        lookup_env(var)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConfigError::MissingToken(var.to_string()))
    }

    pub fn document_fetch_settings(&self, access_token: &str) -> FetchSettings {
        self.fetch.apply(FetchSettings::for_documents(access_token))
    }

    pub fn image_fetch_settings(&self) -> FetchSettings {
        self.fetch.apply(FetchSettings::for_images())
    }

    pub fn targets(&self) -> ImportTargets {
        ImportTargets {
            language_code: self.language_code.clone(),
            document_content_type: self.document_content_type.clone(),
            document_parent_location: self.document_parent_location,
            image_content_type: self.image_content_type.clone(),
            image_parent_location: self.image_parent_location,
        }
    }
}

impl FetchConfig {
    fn apply(&self, mut settings: FetchSettings) -> FetchSettings {
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.redirect_limit {
            settings.redirect_limit = limit;
        }
        if let Some(max_bytes) = self.max_bytes {
            settings.max_bytes = max_bytes;
        }
        settings
    }
}
