//! In-memory Permit2 ledger.
//!
//! Tracks token balances, ERC-20 style allowances and the unordered nonce
//! bitmap, and verifies witness permits exactly as the signature-transfer
//! half of Permit2 does. Checkpoints snapshot the whole ledger so a failed
//! settlement leaves no trace.

use std::collections::HashMap;

use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
	digest::{domain_separator, hash_with_witness, typed_data_hash},
	PermitWitnessTransfer, TransferError, TransferInterface,
};

#[derive(Debug, Clone, Default)]
struct Ledger {
	/// (token, owner) -> balance. Native currency uses the zero token.
	balances: HashMap<(Address, Address), U256>,
	/// (token, owner, spender) -> allowance.
	allowances: HashMap<(Address, Address, Address), U256>,
	/// (owner, word) -> bitmap of used nonces.
	nonces: HashMap<(Address, U256), U256>,
}

impl Ledger {
	fn balance(&self, token: Address, owner: Address) -> U256 {
		self.balances
			.get(&(token, owner))
			.copied()
			.unwrap_or_default()
	}

	fn move_balance(
		&mut self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TransferError> {
		let available = self.balance(token, from);
		if available < amount {
			return Err(TransferError::TransferFailed {
				token,
				from,
				reason: format!("balance {available} below {amount}"),
			});
		}
		self.balances.insert((token, from), available - amount);
		let credited = self.balance(token, to) + amount;
		self.balances.insert((token, to), credited);
		Ok(())
	}

	fn nonce_used(&self, owner: Address, nonce: U256) -> bool {
		let (word, bit) = nonce_position(nonce);
		let bitmap = self.nonces.get(&(owner, word)).copied().unwrap_or_default();
		bitmap & bit != U256::ZERO
	}

	fn use_nonce(&mut self, owner: Address, nonce: U256) -> Result<(), TransferError> {
		let (word, bit) = nonce_position(nonce);
		let bitmap = self.nonces.entry((owner, word)).or_default();
		let flipped = *bitmap ^ bit;
		if flipped & bit == U256::ZERO {
			return Err(TransferError::InvalidNonce(nonce));
		}
		*bitmap = flipped;
		Ok(())
	}
}

/// Word index and bit mask of `nonce` in the owner's bitmap.
fn nonce_position(nonce: U256) -> (U256, U256) {
	let word = nonce >> 8usize;
	let bit = U256::from(1) << (nonce & U256::from(0xff)).to::<usize>();
	(word, bit)
}

#[derive(Debug, Default)]
struct State {
	ledger: Ledger,
	checkpoints: Vec<Ledger>,
}

/// Permit2 with an in-memory token ledger.
pub struct MemoryPermit2 {
	domain_separator: B256,
	state: Mutex<State>,
}

impl MemoryPermit2 {
	/// Creates an empty ledger for the Permit2 deployment at `address` on `chain_id`.
	pub fn new(chain_id: u64, address: Address) -> Self {
		Self {
			domain_separator: domain_separator(chain_id, address),
			state: Mutex::new(State::default()),
		}
	}

	/// Credits `amount` of `token` to `owner`.
	pub async fn mint(&self, token: Address, owner: Address, amount: U256) {
		let mut state = self.state.lock().await;
		let balance = state.ledger.balance(token, owner) + amount;
		state.ledger.balances.insert((token, owner), balance);
	}

	/// Sets `spender`'s allowance over `owner`'s `token`.
	pub async fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) {
		let mut state = self.state.lock().await;
		state
			.ledger
			.allowances
			.insert((token, owner, spender), amount);
	}

	pub async fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
		let state = self.state.lock().await;
		state
			.ledger
			.allowances
			.get(&(token, owner, spender))
			.copied()
			.unwrap_or_default()
	}

	pub async fn is_nonce_used(&self, owner: Address, nonce: U256) -> bool {
		self.state.lock().await.ledger.nonce_used(owner, nonce)
	}

	/// Marks `nonce` as used without a transfer, cancelling any permit that carries it.
	pub async fn invalidate_nonce(&self, owner: Address, nonce: U256) -> Result<(), TransferError> {
		self.state.lock().await.ledger.use_nonce(owner, nonce)
	}

	fn verify_signature(&self, request: &PermitWitnessTransfer) -> Result<(), TransferError> {
		let struct_hash = hash_with_witness(
			&request.permit,
			request.spender,
			request.witness,
			&request.witness_type_string,
		);
		let digest = typed_data_hash(self.domain_separator, struct_hash);

		let signature = PrimitiveSignature::try_from(request.signature.as_ref())
			.map_err(|_| TransferError::InvalidSignature)?;
		let signer = signature
			.recover_address_from_prehash(&digest)
			.map_err(|_| TransferError::InvalidSignature)?;
		if signer != request.owner {
			warn!(expected = %request.owner, recovered = %signer, "Permit signer mismatch");
			return Err(TransferError::InvalidSignature);
		}
		Ok(())
	}
}

#[async_trait]
impl TransferInterface for MemoryPermit2 {
	fn domain_separator(&self) -> B256 {
		self.domain_separator
	}

	async fn permit_witness_transfer_from(
		&self,
		request: PermitWitnessTransfer,
		now: u64,
	) -> Result<(), TransferError> {
		if U256::from(now) > request.permit.deadline {
			return Err(TransferError::SignatureExpired(request.permit.deadline));
		}
		if request.transfer.requestedAmount > request.permit.permitted.amount {
			return Err(TransferError::InvalidAmount(request.permit.permitted.amount));
		}
		self.verify_signature(&request)?;

		let mut state = self.state.lock().await;
		let mut next = state.ledger.clone();
		next.use_nonce(request.owner, request.permit.nonce)?;
		next.move_balance(
			request.permit.permitted.token,
			request.owner,
			request.transfer.to,
			request.transfer.requestedAmount,
		)?;
		state.ledger = next;

		debug!(
			owner = %request.owner,
			nonce = %request.permit.nonce,
			amount = %request.transfer.requestedAmount,
			to = %request.transfer.to,
			"Redeemed permit"
		);
		Ok(())
	}

	async fn transfer_from(
		&self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
		spender: Address,
	) -> Result<(), TransferError> {
		let mut state = self.state.lock().await;
		let key = (token, from, spender);
		let allowance = state
			.ledger
			.allowances
			.get(&key)
			.copied()
			.unwrap_or_default();
		if allowance < amount {
			return Err(TransferError::TransferFailed {
				token,
				from,
				reason: format!("allowance {allowance} below {amount}"),
			});
		}
		state.ledger.move_balance(token, from, to, amount)?;
		if allowance != U256::MAX {
			state.ledger.allowances.insert(key, allowance - amount);
		}
		Ok(())
	}

	async fn transfer_native(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TransferError> {
		let mut state = self.state.lock().await;
		state.ledger.move_balance(Address::ZERO, from, to, amount)
	}

	async fn balance_of(&self, token: Address, owner: Address) -> U256 {
		self.state.lock().await.ledger.balance(token, owner)
	}

	async fn checkpoint(&self) {
		let mut state = self.state.lock().await;
		let snapshot = state.ledger.clone();
		state.checkpoints.push(snapshot);
	}

	async fn commit(&self) -> Result<(), TransferError> {
		let mut state = self.state.lock().await;
		state
			.checkpoints
			.pop()
			.map(|_| ())
			.ok_or(TransferError::NoCheckpoint)
	}

	async fn rollback(&self) -> Result<(), TransferError> {
		let mut state = self.state.lock().await;
		let snapshot = state.checkpoints.pop().ok_or(TransferError::NoCheckpoint)?;
		state.ledger = snapshot;
		Ok(())
	}
}
