//! Settlement dispatcher for Gladius orders.
//!
//! The reactor resolves signed orders, redeems the swappers' permits, lets
//! the filler act in an optional callback and then collects the outputs.
//! A batch settles completely or not at all.

use alloy_primitives::Address;
use gladius_order::OrderError;
use gladius_permit::TransferError;
use thiserror::Error;

pub mod callback;
pub mod quoter;
pub mod reactor;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use callback::FillCallback;
pub use quoter::OrderQuoter;
pub use reactor::{system_clock, Clock, GladiusReactor};
pub use validation::{ExclusiveFillerValidation, ValidationCallback, ValidationRegistry};

#[derive(Debug, Error)]
pub enum ReactorError {
	#[error("Reentrant call")]
	Reentrancy,

	#[error("Order is bound to reactor {0}")]
	InvalidReactor(Address),

	#[error("Order deadline passed")]
	DeadlinePassed,

	#[error("Unknown validation contract {0}")]
	UnknownValidationContract(Address),

	#[error("Additional validation failed: {0}")]
	AdditionalValidationFailed(String),

	#[error("Fill callback failed: {0}")]
	CallbackFailed(String),

	#[error("Got {quantities} quantities for {orders} orders")]
	QuantityLengthMismatch { orders: usize, quantities: usize },

	#[error("Unauthorized caller {0}")]
	Unauthorized(Address),

	#[error("Order error: {0}")]
	Order(#[from] OrderError),

	#[error("Transfer error: {0}")]
	Transfer(#[from] TransferError),
}
