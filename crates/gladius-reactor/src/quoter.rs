//! Off-chain quoting of Gladius orders.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use gladius_types::{ResolvedOrder, SignedOrder};

use crate::{GladiusReactor, ReactorError};

/// Answers "what would this fill move right now?" without moving anything.
///
/// A quote runs the full resolution and validation path plus a permit
/// redemption that is rolled back, so a successful quote means the fill
/// would currently succeed up to the output transfers.
pub struct OrderQuoter {
	reactor: Arc<GladiusReactor>,
}

impl OrderQuoter {
	pub fn new(reactor: Arc<GladiusReactor>) -> Self {
		Self { reactor }
	}

	pub async fn quote(
		&self,
		order: Bytes,
		sig: Bytes,
		quantity: Option<U256>,
		filler: Address,
	) -> Result<ResolvedOrder, ReactorError> {
		self.reactor
			.quote(filler, &SignedOrder { order, sig }, quantity)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;
	use gladius_order::OrderError;

	#[tokio::test]
	async fn test_quote_full_and_partial() {
		let env = TestEnv::new().await;
		let swapper = env.swapper(TOKEN_A, 100).await;
		let signed = env.sign(&swapper, &env.order(&swapper, TOKEN_A, 100, TOKEN_B, 200, 1));
		let quoter = OrderQuoter::new(env.reactor.clone());

		let full = quoter
			.quote(signed.order.clone(), signed.sig.clone(), None, FILLER)
			.await
			.unwrap();
		assert_eq!(full.input.amount, U256::from(100));
		assert_eq!(full.outputs[0].amount, U256::from(200));

		let partial = quoter
			.quote(signed.order, signed.sig, Some(U256::from(25)), FILLER)
			.await
			.unwrap();
		assert_eq!(partial.input.amount, U256::from(25));
		assert_eq!(partial.outputs[0].amount, U256::from(50));
		assert_eq!(partial.hash, full.hash);
	}

	#[tokio::test]
	async fn test_quote_surfaces_errors() {
		let env = TestEnv::new().await;
		let swapper = env.swapper(TOKEN_A, 100).await;
		let signed = env.sign(&swapper, &env.order(&swapper, TOKEN_A, 100, TOKEN_B, 200, 1));
		let quoter = OrderQuoter::new(env.reactor.clone());

		let result = quoter
			.quote(signed.order.clone(), signed.sig, Some(U256::from(101)), FILLER)
			.await;
		assert!(matches!(
			result,
			Err(ReactorError::Order(OrderError::PartialFillOverflow))
		));

		let result = quoter
			.quote(signed.order, Bytes::from_static(&[0u8; 65]), None, FILLER)
			.await;
		assert!(matches!(result, Err(ReactorError::Transfer(_))));
	}

	#[tokio::test]
	async fn test_quote_fails_when_swapper_lacks_funds() {
		let env = TestEnv::new().await;
		let swapper = env.swapper(TOKEN_A, 10).await;
		let signed = env.sign(&swapper, &env.order(&swapper, TOKEN_A, 100, TOKEN_B, 200, 1));

		let result = OrderQuoter::new(env.reactor.clone())
			.quote(signed.order, signed.sig, None, FILLER)
			.await;
		assert!(matches!(result, Err(ReactorError::Transfer(_))));
	}
}
