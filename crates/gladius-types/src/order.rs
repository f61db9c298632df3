//! Order types for the Gladius settlement protocol.
//!
//! Swapper-signed orders travel as ABI-encoded `GladiusOrder` tuples. The
//! reactor decodes them, resolves them against the current time and a fill
//! quantity, and hands the resulting [`ResolvedOrder`] to the transfer layer.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Solidity type definitions for Gladius orders. Field order matters: it is
// the ABI layout swappers sign over.
sol! {
	/// Generic order metadata shared by every reactor order type.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct OrderInfo {
		address reactor;
		address swapper;
		uint256 nonce;
		uint256 deadline;
		address additionalValidationContract;
		bytes additionalValidationData;
	}

	/// Input token with a linearly decaying amount.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct DutchInput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
	}

	/// Output token with a linearly decaying amount.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct DutchOutput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
		address recipient;
	}

	/// Partially fillable exclusive Dutch order.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct GladiusOrder {
		OrderInfo info;
		uint256 decayStartTime;
		uint256 decayEndTime;
		address exclusiveFiller;
		uint256 exclusivityOverrideBps;
		DutchInput input;
		DutchOutput[] outputs;
		uint256 fillThreshold;
	}

	/// Encoded order plus the swapper's signature over it.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct SignedOrder {
		bytes order;
		bytes sig;
	}
}

/// Errors raised while moving orders across the ABI boundary.
#[derive(Debug, Error)]
pub enum EncodingError {
	/// The order bytes are not a valid ABI-encoded `GladiusOrder`.
	#[error("Invalid order encoding: {0}")]
	InvalidOrder(String),
}

impl GladiusOrder {
	/// ABI-encodes the order exactly as `abi.encode(order)` would.
	pub fn encode(&self) -> Bytes {
		self.abi_encode().into()
	}

	/// Decodes an order from its ABI encoding.
	pub fn decode(data: &[u8]) -> Result<Self, EncodingError> {
		<Self as SolValue>::abi_decode(data, true)
			.map_err(|e| EncodingError::InvalidOrder(e.to_string()))
	}

	/// Wraps the encoded order and a signature into a [`SignedOrder`].
	pub fn sign_with(&self, sig: Bytes) -> SignedOrder {
		SignedOrder {
			order: self.encode(),
			sig,
		}
	}

	/// Whether the input amount changes over the decay window.
	pub fn input_decays(&self) -> bool {
		self.input.startAmount != self.input.endAmount
	}

	/// Whether any output amount changes over the decay window.
	pub fn outputs_decay(&self) -> bool {
		self.outputs.iter().any(|o| o.startAmount != o.endAmount)
	}
}

/// Input leg of a resolved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputToken {
	/// Token the swapper provides.
	pub token: Address,
	/// Amount transferred from the swapper for this fill.
	pub amount: U256,
	/// Ceiling the swapper authorised in the permit.
	pub max_amount: U256,
}

/// Output leg of a resolved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputToken {
	/// Token the recipient receives. The zero address denotes native currency.
	pub token: Address,
	/// Amount the filler must deliver.
	pub amount: U256,
	/// Receiver of the output.
	pub recipient: Address,
}

impl OutputToken {
	/// Whether the output is paid in native currency.
	pub fn is_native(&self) -> bool {
		self.token == Address::ZERO
	}
}

/// An order resolved against a fill quantity and point in time.
///
/// Built fresh for every execution attempt and never persisted. `hash` is the
/// EIP-712 hash of the original signed order, not of the resolved amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrder {
	pub info: OrderInfo,
	pub input: InputToken,
	pub outputs: Vec<OutputToken>,
	pub sig: Bytes,
	pub hash: B256,
}
