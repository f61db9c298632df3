//! Linear price decay over the order's decay window.
//!
//! The interpolated delta always rounds down, so an amount moves from
//! `start` toward `end` no faster than the exact line and never past `end`.
//! A shrinking output therefore rounds up (swapper receives more) and a
//! growing input rounds down (swapper pays less).

use alloy_primitives::U256;
use gladius_types::{DutchInput, DutchOutput, InputToken, OutputToken};

use crate::{math::mul_div_down, OrderError, Result};

/// Amount at time `now` on the line from `start_amount` to `end_amount`.
pub fn decay(
	start_amount: U256,
	end_amount: U256,
	decay_start: U256,
	decay_end: U256,
	now: U256,
) -> Result<U256> {
	if decay_end < decay_start {
		return Err(OrderError::OrderEndTimeBeforeStartTime);
	}
	if decay_end <= now {
		return Ok(end_amount);
	}
	if decay_start >= now {
		return Ok(start_amount);
	}

	let elapsed = now - decay_start;
	let duration = decay_end - decay_start;

	if end_amount < start_amount {
		let delta = mul_div_down(start_amount - end_amount, elapsed, duration)
			.ok_or(OrderError::ArithmeticOverflow)?;
		Ok(start_amount - delta)
	} else {
		let delta = mul_div_down(end_amount - start_amount, elapsed, duration)
			.ok_or(OrderError::ArithmeticOverflow)?;
		Ok(start_amount + delta)
	}
}

/// Decays the input leg. The permit ceiling is the larger of the two bounds.
pub fn decay_input(
	input: &DutchInput,
	decay_start: U256,
	decay_end: U256,
	now: U256,
) -> Result<InputToken> {
	let amount = decay(
		input.startAmount,
		input.endAmount,
		decay_start,
		decay_end,
		now,
	)?;

	Ok(InputToken {
		token: input.token,
		amount,
		max_amount: input.startAmount.max(input.endAmount),
	})
}

/// Decays every output. Outputs may only shrink over time.
pub fn decay_outputs(
	outputs: &[DutchOutput],
	decay_start: U256,
	decay_end: U256,
	now: U256,
) -> Result<Vec<OutputToken>> {
	outputs
		.iter()
		.map(|output| {
			if output.startAmount < output.endAmount {
				return Err(OrderError::IncorrectAmounts);
			}
			let amount = decay(
				output.startAmount,
				output.endAmount,
				decay_start,
				decay_end,
				now,
			)?;
			Ok(OutputToken {
				token: output.token,
				amount,
				recipient: output.recipient,
			})
		})
		.collect()
}
