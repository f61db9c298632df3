//! Local private key signer for swappers.
//!
//! Produces the Permit2 witness signatures that make a Gladius order
//! fillable. Suitable for tooling and tests where the key lives in process.

use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use gladius_types::{GladiusOrder, SignedOrder};

use crate::{digest::order_digest, TransferError};

pub struct LocalSigner {
	signer: PrivateKeySigner,
}

impl LocalSigner {
	/// Creates a signer from a hex-encoded private key, with or without 0x prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, TransferError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| TransferError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	/// Creates a signer with a fresh random key.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs a prehashed digest, returning the 65-byte `r ‖ s ‖ v` signature.
	pub fn sign_digest(&self, digest: &B256) -> Result<Bytes, TransferError> {
		let signature = self
			.signer
			.sign_hash_sync(digest)
			.map_err(|e| TransferError::SigningFailed(e.to_string()))?;
		Ok(Bytes::copy_from_slice(&signature.as_bytes()))
	}

	/// Signs `order` for the Permit2 deployment identified by `domain_separator`.
	pub fn sign_order(
		&self,
		order: &GladiusOrder,
		domain_separator: B256,
	) -> Result<SignedOrder, TransferError> {
		let sig = self.sign_digest(&order_digest(order, domain_separator))?;
		Ok(order.sign_with(sig))
	}
}
