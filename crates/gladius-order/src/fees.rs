//! Protocol fee injection.
//!
//! Fee outputs come from an external controller and are checked here against
//! a hard cap of [`MAX_FEE_BPS`] of the order value in the same token. The
//! cap holds no matter what the controller is configured to charge.

use alloy_primitives::U256;
use gladius_fees::FeeControllerInterface;
use gladius_types::{OutputToken, ResolvedOrder, BPS};
use tracing::{debug, warn};

use crate::{math::mul_div_down, OrderError, Result};

/// Maximum fee, in basis points of the matching order value.
pub const MAX_FEE_BPS: u64 = 5;

/// Sum of the order amounts denominated in `token`, including the input.
fn token_value(order: &ResolvedOrder, token: alloy_primitives::Address) -> Result<U256> {
	let mut value = U256::ZERO;
	for output in order.outputs.iter().filter(|o| o.token == token) {
		value = value
			.checked_add(output.amount)
			.ok_or(OrderError::ArithmeticOverflow)?;
	}
	if order.input.token == token {
		value = value
			.checked_add(order.input.amount)
			.ok_or(OrderError::ArithmeticOverflow)?;
	}
	Ok(value)
}

/// Validates `fee_outputs` against `order` and appends them.
pub fn inject_fees(mut order: ResolvedOrder, fee_outputs: Vec<OutputToken>) -> Result<ResolvedOrder> {
	for (i, fee) in fee_outputs.iter().enumerate() {
		if fee_outputs[..i].iter().any(|f| f.token == fee.token) {
			warn!(token = %fee.token, "Duplicate fee output");
			return Err(OrderError::DuplicateFeeOutput(fee.token));
		}

		let value = token_value(&order, fee.token)?;
		if value.is_zero() {
			warn!(token = %fee.token, "Fee charged on token absent from order");
			return Err(OrderError::InvalidFeeToken(fee.token));
		}

		let cap = mul_div_down(value, U256::from(MAX_FEE_BPS), U256::from(BPS))
			.ok_or(OrderError::ArithmeticOverflow)?;
		if fee.amount > cap {
			warn!(token = %fee.token, amount = %fee.amount, %cap, "Fee exceeds cap");
			return Err(OrderError::FeeTooLarge {
				token: fee.token,
				amount: fee.amount,
				recipient: fee.recipient,
			});
		}
	}

	debug!(count = fee_outputs.len(), "Injecting fee outputs");
	order.outputs.extend(fee_outputs);
	Ok(order)
}

/// Queries `controller` for fees and injects them. No controller, no fees.
pub fn apply_fee_controller(
	order: ResolvedOrder,
	controller: Option<&dyn FeeControllerInterface>,
) -> Result<ResolvedOrder> {
	match controller {
		Some(controller) => {
			let fee_outputs = controller.get_fee_outputs(&order);
			inject_fees(order, fee_outputs)
		}
		None => Ok(order),
	}
}
