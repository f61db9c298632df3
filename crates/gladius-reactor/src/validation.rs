//! Additional validation hooks named by `OrderInfo.additionalValidationContract`.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use gladius_types::ResolvedOrder;

/// Extra per-order check run before any tokens move.
pub trait ValidationCallback: Send + Sync {
	fn validate(&self, filler: Address, order: &ResolvedOrder, now: u64) -> Result<(), String>;
}

/// Validation hooks keyed by the address orders refer to them by.
#[derive(Clone, Default)]
pub struct ValidationRegistry {
	callbacks: HashMap<Address, Arc<dyn ValidationCallback>>,
}

impl ValidationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, address: Address, callback: Arc<dyn ValidationCallback>) {
		self.callbacks.insert(address, callback);
	}

	pub fn get(&self, address: &Address) -> Option<&Arc<dyn ValidationCallback>> {
		self.callbacks.get(address)
	}
}

/// Restricts filling to one address until a timestamp.
///
/// Expects `additionalValidationData = abi.encode(address filler, uint256 lastExclusiveTimestamp)`.
pub struct ExclusiveFillerValidation;

impl ValidationCallback for ExclusiveFillerValidation {
	fn validate(&self, filler: Address, order: &ResolvedOrder, now: u64) -> Result<(), String> {
		let (exclusive, last_exclusive) = <(Address, U256)>::abi_decode(
			&order.info.additionalValidationData,
			true,
		)
		.map_err(|e| format!("Malformed validation data: {e}"))?;

		if U256::from(now) <= last_exclusive && filler != exclusive {
			return Err(format!("Filler {filler} is not exclusive filler {exclusive}"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, B256};
	use gladius_types::{InputToken, OrderInfo};

	const EXCLUSIVE: Address = Address::new([0x0e; 20]);

	fn order(data: Bytes) -> ResolvedOrder {
		ResolvedOrder {
			info: OrderInfo {
				reactor: Address::ZERO,
				swapper: Address::ZERO,
				nonce: U256::ZERO,
				deadline: U256::ZERO,
				additionalValidationContract: Address::new([0x0f; 20]),
				additionalValidationData: data,
			},
			input: InputToken {
				token: Address::ZERO,
				amount: U256::ZERO,
				max_amount: U256::ZERO,
			},
			outputs: vec![],
			sig: Bytes::new(),
			hash: B256::ZERO,
		}
	}

	#[test]
	fn test_exclusive_filler_window() {
		let data: Bytes = (EXCLUSIVE, U256::from(100)).abi_encode().into();
		let order = order(data);
		let other = Address::new([0x01; 20]);

		assert!(ExclusiveFillerValidation.validate(EXCLUSIVE, &order, 50).is_ok());
		assert!(ExclusiveFillerValidation.validate(other, &order, 100).is_err());
		assert!(ExclusiveFillerValidation.validate(other, &order, 101).is_ok());
	}

	#[test]
	fn test_malformed_data_rejected() {
		let order = order(Bytes::from_static(&[1, 2, 3]));
		assert!(ExclusiveFillerValidation
			.validate(EXCLUSIVE, &order, 0)
			.is_err());
	}

	#[test]
	fn test_registry_lookup() {
		let mut registry = ValidationRegistry::new();
		let address = Address::new([0x0f; 20]);
		registry.register(address, Arc::new(ExclusiveFillerValidation));
		assert!(registry.get(&address).is_some());
		assert!(registry.get(&Address::ZERO).is_none());
	}
}
