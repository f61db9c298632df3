//! Shared fixtures for reactor tests.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use gladius_permit::{LocalSigner, MemoryPermit2, TransferInterface};
use gladius_types::{DutchInput, DutchOutput, GladiusOrder, OrderInfo, SignedOrder};

use crate::GladiusReactor;

pub const CHAIN_ID: u64 = 1;
pub const NOW: u64 = 1_700_000_000;
pub const PERMIT2: Address = Address::new([0x22; 20]);
pub const REACTOR: Address = Address::new([0x11; 20]);
pub const OWNER: Address = Address::new([0x01; 20]);
pub const FILLER: Address = Address::new([0x33; 20]);
pub const TOKEN_A: Address = Address::new([0xaa; 20]);
pub const TOKEN_B: Address = Address::new([0xbb; 20]);

pub struct TestEnv {
	pub reactor: Arc<GladiusReactor>,
	pub ledger: Arc<MemoryPermit2>,
}

impl TestEnv {
	pub async fn new() -> Self {
		Self::with_reactor(|reactor| reactor).await
	}

	pub async fn with_reactor<F>(configure: F) -> Self
	where
		F: FnOnce(GladiusReactor) -> GladiusReactor,
	{
		let ledger = Arc::new(MemoryPermit2::new(CHAIN_ID, PERMIT2));
		let reactor =
			GladiusReactor::new(REACTOR, OWNER, ledger.clone()).with_clock(Arc::new(|| NOW));
		Self {
			reactor: Arc::new(configure(reactor)),
			ledger,
		}
	}

	/// A fresh swapper holding `amount` of `token`.
	pub async fn swapper(&self, token: Address, amount: u64) -> LocalSigner {
		let signer = LocalSigner::random();
		self.ledger
			.mint(token, signer.address(), U256::from(amount))
			.await;
		signer
	}

	pub async fn fund_filler(&self, token: Address, amount: u64) {
		self.ledger.mint(token, FILLER, U256::from(amount)).await;
		self.approve_filler(token).await;
	}

	pub async fn approve_filler(&self, token: Address) {
		self.ledger
			.approve(token, FILLER, REACTOR, U256::MAX)
			.await;
	}

	/// Non-decaying order selling `amount_in` of `token_in` for `amount_out` of `token_out`.
	pub fn order(
		&self,
		swapper: &LocalSigner,
		token_in: Address,
		amount_in: u64,
		token_out: Address,
		amount_out: u64,
		nonce: u64,
	) -> GladiusOrder {
		GladiusOrder {
			info: OrderInfo {
				reactor: REACTOR,
				swapper: swapper.address(),
				nonce: U256::from(nonce),
				deadline: U256::from(NOW + 1_000),
				additionalValidationContract: Address::ZERO,
				additionalValidationData: Bytes::new(),
			},
			decayStartTime: U256::from(NOW),
			decayEndTime: U256::from(NOW + 100),
			exclusiveFiller: Address::ZERO,
			exclusivityOverrideBps: U256::ZERO,
			input: DutchInput {
				token: token_in,
				startAmount: U256::from(amount_in),
				endAmount: U256::from(amount_in),
			},
			outputs: vec![DutchOutput {
				token: token_out,
				startAmount: U256::from(amount_out),
				endAmount: U256::from(amount_out),
				recipient: swapper.address(),
			}],
			fillThreshold: U256::ZERO,
		}
	}

	pub fn sign(&self, signer: &LocalSigner, order: &GladiusOrder) -> SignedOrder {
		signer
			.sign_order(order, self.ledger.domain_separator())
			.unwrap()
	}

	pub async fn balance(&self, token: Address, owner: Address) -> u64 {
		self.ledger.balance_of(token, owner).await.to::<u64>()
	}
}
