//! Pair-based fee controller.
//!
//! Fees are charged on each output in parts per [`FEE_DENOMINATOR`]. A pair
//! of tokens may carry its own fee; every other pair pays the base fee. Pair
//! keys are direction independent, so `(X, Y)` and `(Y, X)` share one entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use arc_swap::ArcSwap;
use gladius_types::{OutputToken, ResolvedOrder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{FeeControllerInterface, FeeError};

/// Fees are expressed in parts per hundred thousand.
pub const FEE_DENOMINATOR: u64 = 100_000;

/// Fee applied to pairs without an override (1 basis point).
pub const DEFAULT_BASE_FEE: u64 = 10;

/// Override fee for a single token pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFee {
	/// When false the pair falls back to the base fee.
	pub apply_fee: bool,
	pub fee: u64,
}

/// Immutable snapshot of the controller's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTable {
	pub owner: Address,
	pub fee_recipient: Address,
	pub base_fee: u64,
	pub pairs: HashMap<B256, PairFee>,
}

impl FeeTable {
	/// Effective fee for an order trading `token_in` for `token_out`.
	pub fn fee_for(&self, token_in: Address, token_out: Address) -> u64 {
		match self.pairs.get(&pair_hash(token_in, token_out)) {
			Some(pair) if pair.apply_fee => pair.fee,
			_ => self.base_fee,
		}
	}
}

/// Direction-independent key for a token pair.
pub fn pair_hash(a: Address, b: Address) -> B256 {
	let (lo, hi) = if a < b { (a, b) } else { (b, a) };
	keccak256((lo, hi).abi_encode())
}

/// `floor(amount * fee / FEE_DENOMINATOR)` without a wide intermediate.
///
/// Rounds in the swapper's favour, the same direction as the reactor's fee
/// cap, so a fee configured within the cap is never rejected by it.
fn fee_amount(amount: U256, fee: u64) -> U256 {
	let denominator = U256::from(FEE_DENOMINATOR);
	let fee = U256::from(fee);
	let whole = amount / denominator * fee;
	let rest = amount % denominator * fee / denominator;
	whole.saturating_add(rest)
}

/// Pair fee entry in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFeeConfig {
	pub token_a: Address,
	pub token_b: Address,
	pub fee: u64,
	#[serde(default = "default_apply_fee")]
	pub apply_fee: bool,
}

fn default_apply_fee() -> bool {
	true
}

fn default_base_fee() -> u64 {
	DEFAULT_BASE_FEE
}

/// Configuration for [`RubiconFeeController`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeControllerConfig {
	pub owner: Address,
	pub fee_recipient: Address,
	#[serde(default = "default_base_fee")]
	pub base_fee: u64,
	#[serde(default)]
	pub pairs: Vec<PairFeeConfig>,
}

/// Owner-administered pair fee controller.
///
/// Queries read one atomic snapshot of the fee table, so an admin update
/// landing mid-batch affects later orders but never half of one order.
pub struct RubiconFeeController {
	table: ArcSwap<FeeTable>,
	/// Serialises writers; readers never take it.
	writer: Mutex<()>,
}

impl RubiconFeeController {
	/// Creates a controller charging [`DEFAULT_BASE_FEE`] on every pair.
	pub fn new(owner: Address, fee_recipient: Address) -> Self {
		Self {
			table: ArcSwap::from_pointee(FeeTable {
				owner,
				fee_recipient,
				base_fee: DEFAULT_BASE_FEE,
				pairs: HashMap::new(),
			}),
			writer: Mutex::new(()),
		}
	}

	/// Builds a controller from configuration, validating every fee.
	pub fn from_config(config: &FeeControllerConfig) -> Result<Self, FeeError> {
		validate_fee(config.base_fee)?;

		let mut pairs = HashMap::new();
		for pair in &config.pairs {
			validate_pair(pair.token_a, pair.token_b)?;
			validate_fee(pair.fee)?;
			pairs.insert(
				pair_hash(pair.token_a, pair.token_b),
				PairFee {
					apply_fee: pair.apply_fee,
					fee: pair.fee,
				},
			);
		}

		Ok(Self {
			table: ArcSwap::from_pointee(FeeTable {
				owner: config.owner,
				fee_recipient: config.fee_recipient,
				base_fee: config.base_fee,
				pairs,
			}),
			writer: Mutex::new(()),
		})
	}

	/// Current configuration snapshot.
	pub fn snapshot(&self) -> Arc<FeeTable> {
		self.table.load_full()
	}

	pub fn owner(&self) -> Address {
		self.table.load().owner
	}

	/// Effective fee for a pair in the current snapshot.
	pub fn get_pair_fee(&self, token_in: Address, token_out: Address) -> u64 {
		self.table.load().fee_for(token_in, token_out)
	}

	pub fn set_pair_fee(
		&self,
		caller: Address,
		token_a: Address,
		token_b: Address,
		fee: u64,
		apply_fee: bool,
	) -> Result<(), FeeError> {
		validate_pair(token_a, token_b)?;
		validate_fee(fee)?;
		self.update(caller, |table| {
			table
				.pairs
				.insert(pair_hash(token_a, token_b), PairFee { apply_fee, fee });
		})?;
		info!(%token_a, %token_b, fee, apply_fee, "Pair fee updated");
		Ok(())
	}

	pub fn clear_pair_fee(
		&self,
		caller: Address,
		token_a: Address,
		token_b: Address,
	) -> Result<(), FeeError> {
		self.update(caller, |table| {
			table.pairs.remove(&pair_hash(token_a, token_b));
		})?;
		info!(%token_a, %token_b, "Pair fee cleared");
		Ok(())
	}

	pub fn set_base_fee(&self, caller: Address, fee: u64) -> Result<(), FeeError> {
		validate_fee(fee)?;
		self.update(caller, |table| table.base_fee = fee)?;
		info!(fee, "Base fee updated");
		Ok(())
	}

	pub fn set_fee_recipient(&self, caller: Address, recipient: Address) -> Result<(), FeeError> {
		self.update(caller, |table| table.fee_recipient = recipient)?;
		info!(%recipient, "Fee recipient updated");
		Ok(())
	}

	pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), FeeError> {
		self.update(caller, |table| table.owner = new_owner)?;
		info!(%new_owner, "Fee controller ownership transferred");
		Ok(())
	}

	/// Applies `f` to a copy of the table and publishes it if `caller` owns the controller.
	fn update<F>(&self, caller: Address, f: F) -> Result<(), FeeError>
	where
		F: FnOnce(&mut FeeTable),
	{
		let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
		let current = self.table.load_full();
		if current.owner != caller {
			return Err(FeeError::Unauthorized(caller));
		}
		let mut next = (*current).clone();
		f(&mut next);
		self.table.store(Arc::new(next));
		Ok(())
	}
}

fn validate_fee(fee: u64) -> Result<(), FeeError> {
	if fee > FEE_DENOMINATOR {
		return Err(FeeError::InvalidFee(fee));
	}
	Ok(())
}

fn validate_pair(a: Address, b: Address) -> Result<(), FeeError> {
	if a == b {
		return Err(FeeError::InvalidPair(a, b));
	}
	Ok(())
}

/// Factory function to create a fee controller from configuration.
///
/// Expects the `[fees]` table: `owner`, `fee_recipient`, optional
/// `base_fee` and `[[pairs]]` entries.
pub fn create_fee_controller(
	config: &toml::Value,
) -> Result<Box<dyn FeeControllerInterface>, FeeError> {
	let config: FeeControllerConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| FeeError::InvalidConfig(e.to_string()))?;
	Ok(Box::new(RubiconFeeController::from_config(&config)?))
}

impl FeeControllerInterface for RubiconFeeController {
	fn get_fee_outputs(&self, order: &ResolvedOrder) -> Vec<OutputToken> {
		let table = self.table.load();
		let mut fee_outputs: Vec<OutputToken> = Vec::new();

		for output in &order.outputs {
			let fee = table.fee_for(order.input.token, output.token);
			let amount = fee_amount(output.amount, fee);
			if amount.is_zero() {
				continue;
			}

			match fee_outputs.iter_mut().find(|f| f.token == output.token) {
				Some(existing) => existing.amount = existing.amount.saturating_add(amount),
				None => fee_outputs.push(OutputToken {
					token: output.token,
					amount,
					recipient: table.fee_recipient,
				}),
			}
		}

		fee_outputs
	}
}
