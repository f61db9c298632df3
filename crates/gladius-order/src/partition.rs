//! Proportional partitioning of a single-output order for a partial fill.
//!
//! `quantity` is measured in the input token. The filler owes
//! `ceil(quantity * output / input)` so the swapper's exchange rate can only
//! improve through rounding. Fills whose remainder is too coarse relative to
//! `input * quantity` are rejected. The fill threshold binds the input side.

use alloy_primitives::U256;
use gladius_types::{InputToken, OutputToken};
use tracing::debug;

use crate::{
	math::{mul_div_up, mul_mod, product_gte},
	OrderError, Result,
};

/// Denominator of the maximum relative rounding error (1/1000 = 0.1%).
pub const RELATIVE_ERROR_DENOMINATOR: u64 = 1_000;

/// Rejects thresholds larger than the amount they are measured against.
pub fn validate_threshold(fill_threshold: U256, input_amount: U256) -> Result<()> {
	if fill_threshold > input_amount {
		return Err(OrderError::InvalidThreshold);
	}
	Ok(())
}

/// Checks a candidate partition against the decayed order amounts.
///
/// Checks run in a fixed order and the first violation wins.
pub fn validate_partition(
	quantity: U256,
	spend: U256,
	input_amount: U256,
	output_amount: U256,
	fill_threshold: U256,
) -> Result<()> {
	if quantity > input_amount || spend > output_amount {
		return Err(OrderError::PartialFillOverflow);
	}
	if quantity.is_zero() || spend.is_zero() {
		return Err(OrderError::PartialFillUnderflow);
	}
	if quantity < fill_threshold {
		return Err(OrderError::QuantityLtThreshold);
	}

	let remainder =
		mul_mod(quantity, output_amount, input_amount).ok_or(OrderError::ArithmeticOverflow)?;
	if product_gte(
		remainder,
		U256::from(RELATIVE_ERROR_DENOMINATOR),
		input_amount,
		quantity,
	) {
		return Err(OrderError::RelativeErrTooBig);
	}

	Ok(())
}

/// Scales `input` and the single output down to `quantity` of input.
pub fn partition(
	quantity: U256,
	input: InputToken,
	mut outputs: Vec<OutputToken>,
	fill_threshold: U256,
) -> Result<(InputToken, Vec<OutputToken>)> {
	if outputs.len() != 1 {
		return Err(OrderError::InvalidOutLength);
	}
	validate_threshold(fill_threshold, input.amount)?;

	let output_amount = outputs[0].amount;
	if input.amount.is_zero() {
		return Err(if quantity.is_zero() {
			OrderError::PartialFillUnderflow
		} else {
			OrderError::PartialFillOverflow
		});
	}

	let spend =
		mul_div_up(quantity, output_amount, input.amount).ok_or(OrderError::PartialFillOverflow)?;
	validate_partition(quantity, spend, input.amount, output_amount, fill_threshold)?;

	debug!(
		%quantity,
		%spend,
		input_amount = %input.amount,
		output_amount = %output_amount,
		"Partitioned order"
	);

	outputs[0].amount = spend;
	Ok((
		InputToken {
			amount: quantity,
			..input
		},
		outputs,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::Address;

	const ETHER: u128 = 1_000_000_000_000_000_000;

	fn input(amount: U256) -> InputToken {
		InputToken {
			token: Address::repeat_byte(0xa),
			amount,
			max_amount: amount,
		}
	}

	fn output(amount: U256) -> Vec<OutputToken> {
		vec![OutputToken {
			token: Address::repeat_byte(0xb),
			amount,
			recipient: Address::repeat_byte(0xc),
		}]
	}

	fn ether(x: u128) -> U256 {
		U256::from(x * ETHER)
	}

	#[test]
	fn test_partition_scenario_from_ask() {
		// input 100, output 200, threshold 2.5, buy 90
		let (i, o) = partition(
			ether(90),
			input(ether(100)),
			output(ether(200)),
			U256::from(25u128 * ETHER / 10),
		)
		.unwrap();
		assert_eq!(i.amount, ether(90));
		assert_eq!(i.max_amount, ether(100));
		assert_eq!(o[0].amount, ether(180));
	}

	#[test]
	fn test_small_amounts_same_ratio() {
		let (i, o) = partition(
			U256::from(90),
			input(U256::from(100)),
			output(U256::from(200)),
			U256::ZERO,
		)
		.unwrap();
		assert_eq!(i.amount, U256::from(90));
		assert_eq!(o[0].amount, U256::from(180));
	}

	#[test]
	fn test_full_quantity_returns_full_order() {
		let (i, o) = partition(
			ether(100),
			input(ether(100)),
			output(ether(200)),
			U256::ZERO,
		)
		.unwrap();
		assert_eq!(i.amount, ether(100));
		assert_eq!(o[0].amount, ether(200));
	}

	#[test]
	fn test_zero_quantity_underflows() {
		let result = partition(U256::ZERO, input(ether(100)), output(ether(200)), U256::ZERO);
		assert_eq!(result, Err(OrderError::PartialFillUnderflow));
	}

	#[test]
	fn test_quantity_above_input_overflows() {
		let result = partition(
			ether(100) + U256::from(1),
			input(ether(100)),
			output(ether(200)),
			U256::ZERO,
		);
		assert_eq!(result, Err(OrderError::PartialFillOverflow));
	}

	#[test]
	fn test_quantity_below_threshold() {
		let result = partition(ether(1), input(ether(100)), output(ether(200)), ether(2));
		assert_eq!(result, Err(OrderError::QuantityLtThreshold));
	}

	#[test]
	fn test_quantity_equal_to_threshold_allowed() {
		let (i, _) =
			partition(ether(2), input(ether(100)), output(ether(200)), ether(2)).unwrap();
		assert_eq!(i.amount, ether(2));
	}

	#[test]
	fn test_threshold_above_input_is_invalid() {
		let result = partition(ether(50), input(ether(100)), output(ether(200)), ether(101));
		assert_eq!(result, Err(OrderError::InvalidThreshold));
	}

	#[test]
	fn test_multiple_outputs_rejected() {
		let mut outputs = output(ether(200));
		outputs.push(outputs[0].clone());
		let result = partition(ether(50), input(ether(100)), outputs, U256::ZERO);
		assert_eq!(result, Err(OrderError::InvalidOutLength));
	}

	#[test]
	fn test_rounding_error_too_big_for_dust() {
		// 1 * 3 / 2 = 1.5 -> spend 2, error 33%
		let result = partition(
			U256::from(1),
			input(U256::from(2)),
			output(U256::from(3)),
			U256::ZERO,
		);
		assert_eq!(result, Err(OrderError::RelativeErrTooBig));
	}

	#[test]
	fn test_rounding_error_boundary() {
		// input 1000, output 999: remainder is 1000 - q, rejected while 1000 - q >= q
		let result = partition(
			U256::from(500),
			input(U256::from(1000)),
			output(U256::from(999)),
			U256::ZERO,
		);
		assert_eq!(result, Err(OrderError::RelativeErrTooBig));

		let (i, o) = partition(
			U256::from(501),
			input(U256::from(1000)),
			output(U256::from(999)),
			U256::ZERO,
		)
		.unwrap();
		assert_eq!(i.amount, U256::from(501));
		assert_eq!(o[0].amount, U256::from(501));
	}

	#[test]
	fn test_spend_rounds_up_for_filler() {
		let (_, o) = partition(
			ether(1) + U256::from(1),
			input(ether(3)),
			output(ether(1)),
			U256::ZERO,
		)
		.unwrap();
		// exact value is 1/3 ether + 1/3 wei
		assert_eq!(o[0].amount, U256::from(ETHER / 3 + 1));
	}

	#[test]
	fn test_rate_preserved_and_bounded_across_quantities() {
		let input_amount = U256::from(997_000_003u64);
		let output_amount = U256::from(1_234_567_891u64);
		for q in (1_000u64..997_000_003).step_by(9_999_991) {
			let quantity = U256::from(q);
			let (i, o) = partition(
				quantity,
				input(input_amount),
				output(output_amount),
				U256::ZERO,
			)
			.unwrap();
			let spend = o[0].amount;

			assert!(i.amount > U256::ZERO && i.amount <= input_amount);
			assert!(spend > U256::ZERO && spend <= output_amount);

			// spend * I >= q * O (swapper never shortchanged) ...
			assert!(product_gte(spend, input_amount, quantity, output_amount));
			// ... and the overshoot is under 0.1% of the fair amount
			let fair = quantity * output_amount;
			let overshoot = spend * input_amount - fair;
			assert!(overshoot * U256::from(1000) < fair);
		}
	}
}
