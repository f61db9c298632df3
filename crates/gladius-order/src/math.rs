//! Full-precision `mulDiv` helpers.
//!
//! Products are formed in 512 bits so `x * y` never overflows before the
//! division. A result that does not fit back into 256 bits, or a zero
//! denominator, yields `None`.

use alloy_primitives::{U256, U512};

fn widen(x: U256) -> U512 {
	let l = x.as_limbs();
	U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

fn narrow(x: U512) -> Option<U256> {
	let l = x.as_limbs();
	if l[4..].iter().any(|&limb| limb != 0) {
		return None;
	}
	Some(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

fn mul_div_rem(x: U256, y: U256, denominator: U256) -> Option<(U512, U512)> {
	if denominator.is_zero() {
		return None;
	}
	Some((widen(x) * widen(y)).div_rem(widen(denominator)))
}

/// `floor(x * y / denominator)`.
pub fn mul_div_down(x: U256, y: U256, denominator: U256) -> Option<U256> {
	let (quotient, _) = mul_div_rem(x, y, denominator)?;
	narrow(quotient)
}

/// `ceil(x * y / denominator)`.
pub fn mul_div_up(x: U256, y: U256, denominator: U256) -> Option<U256> {
	let (quotient, remainder) = mul_div_rem(x, y, denominator)?;
	if remainder.is_zero() {
		narrow(quotient)
	} else {
		narrow(quotient + U512::from(1u8))
	}
}

/// `(x * y) mod modulus`.
pub fn mul_mod(x: U256, y: U256, modulus: U256) -> Option<U256> {
	let (_, remainder) = mul_div_rem(x, y, modulus)?;
	narrow(remainder)
}

/// `a * b >= c * d` without overflow.
pub fn product_gte(a: U256, b: U256, c: U256, d: U256) -> bool {
	widen(a) * widen(b) >= widen(c) * widen(d)
}
