//! Demonstration CLI configuration: where to look for a cache-backed
//! listing and how to set up logging by default. Not part of the core —
//! `listing-core` takes its collaborators as trait objects constructed by
//! the caller, never a config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating CLI configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid configuration: {message}")]
	Invalid { message: String },
}

/// Top-level CLI configuration, loaded from an optional TOML file and
/// overridden by command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
	pub analysis: AnalysisConfig,
	pub logging: LoggingConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self { analysis: AnalysisConfig::default(), logging: LoggingConfig::default() }
	}
}

/// Settings for the `analyze` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
	/// Directory the listing's disk cache is paged to, if any.
	pub cache_dir: Option<PathBuf>,
	/// Cap on the number of instructions `walk` will visit per function,
	/// as a safety net against pathological control flow in untrusted
	/// input; `None` means unbounded.
	pub max_path_len: Option<usize>,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self { cache_dir: None, max_path_len: None }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
	pub default_level: String,
	pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self { default_level: "info".to_owned(), log_dir: PathBuf::from(".logs") }
	}
}

impl Config {
	/// Load configuration from a TOML file, falling back to defaults for
	/// any field the file omits.
	///
	/// # Errors
	/// Returns [`ConfigError::Read`] if the file cannot be read, or
	/// [`ConfigError::Parse`] if it is not valid TOML for this shape.
	pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
		let config: Self =
			toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
		config.validate()?;
		Ok(config)
	}

	/// Check invariants a TOML file can't express (e.g. non-negative but
	/// meaningful bounds).
	///
	/// # Errors
	/// Returns [`ConfigError::Invalid`] if `max_path_len` is `Some(0)`,
	/// which would make every `walk` trivially empty.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.analysis.max_path_len == Some(0) {
			return Err(ConfigError::Invalid {
				message: "analysis.max_path_len of 0 would discard every function path".to_owned(),
			});
		}
		Ok(())
	}
}

/// Fluent builder for [`Config`], for constructing one from CLI flags
/// without round-tripping through TOML.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
	config: Config,
}

impl ConfigBuilder {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.config.analysis.cache_dir = Some(dir.into());
		self
	}

	#[must_use]
	pub fn max_path_len(mut self, max: usize) -> Self {
		self.config.analysis.max_path_len = Some(max);
		self
	}

	#[must_use]
	pub fn log_level(mut self, level: impl Into<String>) -> Self {
		self.config.logging.default_level = level.into();
		self
	}

	/// # Errors
	/// Returns [`ConfigError::Invalid`] if the accumulated configuration
	/// fails [`Config::validate`].
	pub fn build(self) -> Result<Config, ConfigError> {
		self.config.validate()?;
		Ok(self.config)
	}
}
