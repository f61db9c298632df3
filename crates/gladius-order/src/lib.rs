//! Order resolution engine for the Gladius settlement protocol.
//!
//! Turns a swapper-signed order plus a requested fill quantity into the exact
//! amounts that must move. Every function here is pure: the same inputs and
//! timestamp always give the same [`ResolvedOrder`](gladius_types::ResolvedOrder),
//! and any failure aborts the whole resolution.

use alloy_primitives::{Address, U256};
use thiserror::Error;

pub mod decay;
pub mod exclusivity;
pub mod fees;
pub mod math;
pub mod partition;
pub mod resolver;

pub use resolver::{OrderResolver, ResolutionStage};

/// Errors that can occur while resolving an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
	/// The order bytes could not be decoded.
	#[error("Invalid order encoding: {0}")]
	InvalidOrderEncoding(String),
	/// Gladius orders carry exactly one output.
	#[error("Order must have exactly one output")]
	InvalidOutLength,
	/// The order expires before its decay window closes.
	#[error("Deadline before decay end time")]
	DeadlineBeforeEndTime,
	/// The decay window ends before it starts.
	#[error("Decay end time before decay start time")]
	OrderEndTimeBeforeStartTime,
	/// Input and output amounts may not both decay.
	#[error("Input and output cannot both decay")]
	InputAndOutputDecay,
	/// An output amount increases over the decay window.
	#[error("Output start amount below end amount")]
	IncorrectAmounts,
	/// The fill threshold exceeds the amount it is measured against.
	#[error("Fill threshold exceeds order amount")]
	InvalidThreshold,
	/// The requested fill exceeds what the order currently offers.
	#[error("Partial fill exceeds order amount")]
	PartialFillOverflow,
	/// The requested fill rounds to nothing on either side.
	#[error("Partial fill is empty")]
	PartialFillUnderflow,
	/// The requested quantity is below the order's fill threshold.
	#[error("Quantity below fill threshold")]
	QuantityLtThreshold,
	/// Rounding the partial fill would distort the exchange rate by 0.1% or more.
	#[error("Relative rounding error too big")]
	RelativeErrTooBig,
	/// Two fee outputs share a token.
	#[error("Duplicate fee output for token {0}")]
	DuplicateFeeOutput(Address),
	/// A fee output exceeds the protocol fee cap.
	#[error("Fee of {amount} in token {token} to {recipient} exceeds cap")]
	FeeTooLarge {
		token: Address,
		amount: U256,
		recipient: Address,
	},
	/// A fee is charged on a token the order does not touch.
	#[error("Fee token {0} not present in order")]
	InvalidFeeToken(Address),
	/// An intermediate amount does not fit in 256 bits.
	#[error("Arithmetic overflow")]
	ArithmeticOverflow,
}

/// Broad category of an [`OrderError`], used by dispatchers to decide
/// whether a different quantity could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The order itself is malformed; a new order is required.
	Structural,
	/// The quantity does not fit the order's current state.
	Partition,
	/// The fee controller proposed invalid fees.
	Fee,
}

impl OrderError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			OrderError::PartialFillOverflow
			| OrderError::PartialFillUnderflow
			| OrderError::QuantityLtThreshold
			| OrderError::RelativeErrTooBig => ErrorKind::Partition,
			OrderError::DuplicateFeeOutput(_)
			| OrderError::FeeTooLarge { .. }
			| OrderError::InvalidFeeToken(_) => ErrorKind::Fee,
			_ => ErrorKind::Structural,
		}
	}

	/// Whether retrying the same order with another quantity, filler or time may succeed.
	pub fn is_retryable(&self) -> bool {
		self.kind() == ErrorKind::Partition
	}
}

pub type Result<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds() {
		assert_eq!(OrderError::InvalidOutLength.kind(), ErrorKind::Structural);
		assert_eq!(OrderError::InvalidThreshold.kind(), ErrorKind::Structural);
		assert_eq!(OrderError::RelativeErrTooBig.kind(), ErrorKind::Partition);
		assert_eq!(
			OrderError::InvalidFeeToken(Address::ZERO).kind(),
			ErrorKind::Fee
		);
		assert!(OrderError::PartialFillOverflow.is_retryable());
		assert!(!OrderError::InputAndOutputDecay.is_retryable());
	}
}
