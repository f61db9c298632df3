//! Transfer and signature authority for the Gladius reactor.
//!
//! The reactor never moves tokens itself. It asks a [`TransferInterface`]
//! implementation to redeem swapper permits, pull filler outputs and move
//! native currency, all inside a checkpoint it can commit or roll back.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

pub mod digest;

/// Re-export implementations
pub mod implementations {
	pub mod local;
	pub mod memory;
}

pub use digest::{PermitTransferFrom, SignatureTransferDetails, TokenPermissions};
pub use implementations::local::LocalSigner;
pub use implementations::memory::MemoryPermit2;

/// Errors that can occur during permit redemption and token transfers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
	/// The signature is malformed or was not produced by the owner.
	#[error("Invalid signature")]
	InvalidSignature,
	/// The permit deadline has passed.
	#[error("Signature expired at {0}")]
	SignatureExpired(U256),
	/// The permit nonce was already used.
	#[error("Invalid nonce {0}")]
	InvalidNonce(U256),
	/// The requested amount exceeds the permitted maximum.
	#[error("Requested amount exceeds permitted {0}")]
	InvalidAmount(U256),
	/// Balance or allowance does not cover the transfer.
	#[error("Transfer of {token} from {from} failed: {reason}")]
	TransferFailed {
		token: Address,
		from: Address,
		reason: String,
	},
	/// `commit` or `rollback` without an open checkpoint.
	#[error("No open checkpoint")]
	NoCheckpoint,
	/// A private key could not be parsed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Signing a digest failed.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
}

/// A witness permit redemption request.
#[derive(Debug, Clone)]
pub struct PermitWitnessTransfer {
	pub permit: PermitTransferFrom,
	pub transfer: SignatureTransferDetails,
	/// Token owner and expected signer.
	pub owner: Address,
	/// Caller redeeming the permit; part of the signed data.
	pub spender: Address,
	pub witness: B256,
	pub witness_type_string: String,
	pub signature: Bytes,
}

/// Trait defining the interface for transfer authorities.
///
/// Native currency is addressed as the zero token address.
#[async_trait]
pub trait TransferInterface: Send + Sync {
	/// EIP-712 domain separator permits are signed against.
	fn domain_separator(&self) -> B256;

	/// Verifies a witness permit at time `now`, consumes its nonce and moves
	/// `requestedAmount` from the owner to the requested recipient.
	async fn permit_witness_transfer_from(
		&self,
		request: PermitWitnessTransfer,
		now: u64,
	) -> Result<(), TransferError>;

	/// Moves `amount` of `token` from `from` to `to` using `spender`'s allowance.
	async fn transfer_from(
		&self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
		spender: Address,
	) -> Result<(), TransferError>;

	/// Moves native currency between two accounts.
	async fn transfer_native(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TransferError>;

	async fn balance_of(&self, token: Address, owner: Address) -> U256;

	/// Opens a checkpoint. Checkpoints nest.
	async fn checkpoint(&self);

	/// Keeps all changes since the innermost checkpoint.
	async fn commit(&self) -> Result<(), TransferError>;

	/// Discards all changes since the innermost checkpoint.
	async fn rollback(&self) -> Result<(), TransferError>;
}
