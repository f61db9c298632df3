//! Protocol fee controllers for the Gladius reactor.
//!
//! A fee controller inspects a resolved order and proposes fee outputs. The
//! reactor treats it as an untrusted collaborator: whatever it proposes is
//! checked against the protocol fee cap before being appended to the order.

use alloy_primitives::Address;
use gladius_types::{OutputToken, ResolvedOrder};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod rubicon;
}

pub use implementations::rubicon::{
	create_fee_controller, FeeControllerConfig, PairFeeConfig, RubiconFeeController,
};

/// Errors that can occur while administering a fee controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
	/// The caller is not the controller's owner.
	#[error("Unauthorized caller {0}")]
	Unauthorized(Address),
	/// The fee is larger than the fee denominator.
	#[error("Invalid fee {0}")]
	InvalidFee(u64),
	/// A pair must consist of two distinct tokens.
	#[error("Invalid pair {0} / {1}")]
	InvalidPair(Address, Address),
	/// The controller configuration could not be parsed.
	#[error("Invalid fee controller configuration: {0}")]
	InvalidConfig(String),
}

/// Trait defining the interface for protocol fee controllers.
///
/// Implementations must be pure queries: the reactor may call them once per
/// order in a batch and expects each call to read a consistent snapshot.
pub trait FeeControllerInterface: Send + Sync {
	/// Proposes the fee outputs to append to `order`.
	fn get_fee_outputs(&self, order: &ResolvedOrder) -> Vec<OutputToken>;
}
