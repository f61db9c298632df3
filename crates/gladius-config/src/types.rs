//! Configuration file layout.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Canonical Permit2 deployment, identical on every supported chain.
pub const DEFAULT_PERMIT2: Address = address!("000000000022D473030F116dDEE9F6B43aC78BA3");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GladiusConfig {
	pub reactor: ReactorConfig,
	#[serde(default)]
	pub fees: Option<FeesConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactorConfig {
	/// Address orders must name in `info.reactor`.
	pub address: Address,
	/// Administrator allowed to change the fee controller.
	#[serde(default)]
	pub owner: Address,
	pub chain_id: u64,
	#[serde(default = "default_permit2")]
	pub permit2: Address,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// `[fees]` section. Everything except `enabled` is handed to the fee
/// controller factory untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesConfig {
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(flatten)]
	pub controller: toml::Table,
}

impl FeesConfig {
	pub fn controller_config(&self) -> toml::Value {
		toml::Value::Table(self.controller.clone())
	}
}

fn default_permit2() -> Address {
	DEFAULT_PERMIT2
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_enabled() -> bool {
	true
}
