//! Configuration loading for the Gladius reactor.
//!
//! Reads a TOML file, substitutes `${VAR}` references from the environment,
//! applies `GLADIUS_*` overrides and validates the result.

use std::env;
use std::path::Path;

use alloy_primitives::Address;
use gladius_fees::create_fee_controller;
use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::{FeesConfig, GladiusConfig, ReactorConfig, DEFAULT_PERMIT2};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "GLADIUS_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<GladiusConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<GladiusConfig, ConfigError> {
		if !Path::new(file_path).exists() {
			return Err(ConfigError::FileNotFound(file_path.to_string()));
		}
		let content = tokio::fs::read_to_string(file_path).await?;
		parse_config(&content)
	}

	fn apply_env_overrides(&self, config: &mut GladiusConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!(%log_level, "Overriding log level from environment");
			config.reactor.log_level = log_level;
		}

		if let Ok(chain_id) = env::var(format!("{}CHAIN_ID", self.env_prefix)) {
			config.reactor.chain_id = chain_id
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid chain id: {}", e)))?;
		}

		if let Ok(reactor) = env::var(format!("{}REACTOR", self.env_prefix)) {
			config.reactor.address = reactor.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid reactor address: {}", e))
			})?;
		}

		Ok(())
	}
}

/// Parses configuration text after substituting `${VAR}` references.
pub fn parse_config(content: &str) -> Result<GladiusConfig, ConfigError> {
	let substituted = substitute_env_vars(content)?;
	toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let mut result = content.to_string();

	let re = regex::Regex::new(r"\$\{([^}]+)\}")
		.map_err(|e| ConfigError::ParseError(e.to_string()))?;

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

pub fn validate_config(config: &GladiusConfig) -> Result<(), ConfigError> {
	if config.reactor.address == Address::ZERO {
		return Err(ConfigError::ValidationError(
			"Reactor address must be set".to_string(),
		));
	}
	if config.reactor.chain_id == 0 {
		return Err(ConfigError::ValidationError(
			"Chain id must be non-zero".to_string(),
		));
	}
	if config.reactor.permit2 == Address::ZERO {
		return Err(ConfigError::ValidationError(
			"Permit2 address must be set".to_string(),
		));
	}

	if let Some(fees) = config.fees.as_ref().filter(|f| f.enabled) {
		create_fee_controller(&fees.controller_config())
			.map_err(|e| ConfigError::ValidationError(format!("Invalid fee configuration: {}", e)))?;
	}

	Ok(())
}
