//! Exclusivity override for fills inside another filler's exclusivity window.
//!
//! Before the window ends, a filler other than the designated one must
//! over-deliver every output by `override_bps`. The override only raises the
//! price of filling; it never blocks a fill, and an override of zero leaves
//! the outputs unchanged.

use alloy_primitives::{Address, U256};
use gladius_types::{OutputToken, BPS};

use crate::{math::mul_div_up, OrderError, Result};

/// Whether `filler` may fill at `now` without paying the override.
pub fn has_filling_rights(
	exclusive_filler: Address,
	exclusivity_end: U256,
	filler: Address,
	now: U256,
) -> bool {
	exclusive_filler == Address::ZERO || now >= exclusivity_end || filler == exclusive_filler
}

/// Scales outputs for a filler without exclusive rights.
pub fn apply_override(
	outputs: Vec<OutputToken>,
	exclusive_filler: Address,
	exclusivity_end: U256,
	override_bps: U256,
	filler: Address,
	now: U256,
) -> Result<Vec<OutputToken>> {
	if override_bps.is_zero()
		|| has_filling_rights(exclusive_filler, exclusivity_end, filler, now)
	{
		return Ok(outputs);
	}

	let bps = U256::from(BPS);
	let scale = bps
		.checked_add(override_bps)
		.ok_or(OrderError::ArithmeticOverflow)?;

	outputs
		.into_iter()
		.map(|mut output| {
			output.amount =
				mul_div_up(output.amount, scale, bps).ok_or(OrderError::ArithmeticOverflow)?;
			Ok(output)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXCLUSIVE: Address = Address::new([0xee; 20]);
	const OTHER: Address = Address::new([0x0f; 20]);

	fn outputs(amount: u64) -> Vec<OutputToken> {
		vec![OutputToken {
			token: Address::repeat_byte(1),
			amount: U256::from(amount),
			recipient: Address::repeat_byte(2),
		}]
	}

	#[test]
	fn test_no_exclusive_filler_means_no_adjustment() {
		let result = apply_override(
			outputs(1000),
			Address::ZERO,
			U256::from(100),
			U256::from(50),
			OTHER,
			U256::from(10),
		)
		.unwrap();
		assert_eq!(result, outputs(1000));
	}

	#[test]
	fn test_exclusive_filler_pays_nothing_extra() {
		let result = apply_override(
			outputs(1000),
			EXCLUSIVE,
			U256::from(100),
			U256::from(50),
			EXCLUSIVE,
			U256::from(10),
		)
		.unwrap();
		assert_eq!(result, outputs(1000));
	}

	#[test]
	fn test_window_elapsed_means_no_adjustment() {
		let result = apply_override(
			outputs(1000),
			EXCLUSIVE,
			U256::from(100),
			U256::from(50),
			OTHER,
			U256::from(100),
		)
		.unwrap();
		assert_eq!(result, outputs(1000));
	}

	#[test]
	fn test_other_filler_over_delivers() {
		let result = apply_override(
			outputs(1000),
			EXCLUSIVE,
			U256::from(100),
			U256::from(100),
			OTHER,
			U256::from(99),
		)
		.unwrap();
		assert_eq!(result, outputs(1010));
	}

	#[test]
	fn test_override_rounds_up() {
		// 333 * 1.0001 = 333.0333
		let result = apply_override(
			outputs(333),
			EXCLUSIVE,
			U256::from(100),
			U256::from(1),
			OTHER,
			U256::ZERO,
		)
		.unwrap();
		assert_eq!(result, outputs(334));
	}

	#[test]
	fn test_zero_override_lets_other_fillers_in_unchanged() {
		let result = apply_override(
			outputs(1000),
			EXCLUSIVE,
			U256::from(100),
			U256::ZERO,
			OTHER,
			U256::from(50),
		)
		.unwrap();
		assert_eq!(result, outputs(1000));
	}

	#[test]
	fn test_override_never_lowers_outputs() {
		for bps in [1u64, 7, 100, 10_000] {
			let result = apply_override(
				outputs(999),
				EXCLUSIVE,
				U256::from(100),
				U256::from(bps),
				OTHER,
				U256::from(50),
			)
			.unwrap();
			assert!(result[0].amount > U256::from(999));
		}
	}
}
