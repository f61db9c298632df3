//! EIP-712 type strings and struct hashing for Gladius orders.
//!
//! The order hash doubles as the Permit2 witness, so these strings must match
//! byte for byte what swappers sign. Referenced types are appended in
//! alphabetical order after the primary type.

use alloy_primitives::{keccak256, B256};
use alloy_sol_types::SolValue;

use crate::{DutchOutput, GladiusOrder, OrderInfo};

/// Primary type of a Gladius order. The input leg is flattened into three fields.
pub const GLADIUS_ORDER_TYPE: &str = concat!(
	"GladiusOrder(",
	"OrderInfo info,",
	"uint256 decayStartTime,",
	"uint256 decayEndTime,",
	"address exclusiveFiller,",
	"uint256 exclusivityOverrideBps,",
	"address inputToken,",
	"uint256 inputStartAmount,",
	"uint256 inputEndAmount,",
	"DutchOutput[] outputs,",
	"uint256 fillThreshold)"
);

pub const DUTCH_OUTPUT_TYPE: &str =
	"DutchOutput(address token,uint256 startAmount,uint256 endAmount,address recipient)";

pub const ORDER_INFO_TYPE: &str = concat!(
	"OrderInfo(",
	"address reactor,",
	"address swapper,",
	"uint256 nonce,",
	"uint256 deadline,",
	"address additionalValidationContract,",
	"bytes additionalValidationData)"
);

pub const TOKEN_PERMISSIONS_TYPE: &str = "TokenPermissions(address token,uint256 amount)";

/// Full encoded type of a Gladius order including referenced structs.
pub const ORDER_TYPE: &str = concat!(
	"GladiusOrder(",
	"OrderInfo info,",
	"uint256 decayStartTime,",
	"uint256 decayEndTime,",
	"address exclusiveFiller,",
	"uint256 exclusivityOverrideBps,",
	"address inputToken,",
	"uint256 inputStartAmount,",
	"uint256 inputEndAmount,",
	"DutchOutput[] outputs,",
	"uint256 fillThreshold)",
	"DutchOutput(address token,uint256 startAmount,uint256 endAmount,address recipient)",
	"OrderInfo(",
	"address reactor,",
	"address swapper,",
	"uint256 nonce,",
	"uint256 deadline,",
	"address additionalValidationContract,",
	"bytes additionalValidationData)"
);

/// Witness type string handed to Permit2 alongside the order hash.
///
/// Layout is `GladiusOrder witness)` ++ [`ORDER_TYPE`] ++ [`TOKEN_PERMISSIONS_TYPE`].
/// Permit2 prepends `PermitWitnessTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline,`
/// so the string starts with the witness member and closes that struct.
pub const PERMIT2_ORDER_TYPE: &str = concat!(
	"GladiusOrder witness)",
	"GladiusOrder(",
	"OrderInfo info,",
	"uint256 decayStartTime,",
	"uint256 decayEndTime,",
	"address exclusiveFiller,",
	"uint256 exclusivityOverrideBps,",
	"address inputToken,",
	"uint256 inputStartAmount,",
	"uint256 inputEndAmount,",
	"DutchOutput[] outputs,",
	"uint256 fillThreshold)",
	"DutchOutput(address token,uint256 startAmount,uint256 endAmount,address recipient)",
	"OrderInfo(",
	"address reactor,",
	"address swapper,",
	"uint256 nonce,",
	"uint256 deadline,",
	"address additionalValidationContract,",
	"bytes additionalValidationData)",
	"TokenPermissions(address token,uint256 amount)"
);

/// Type hash of [`ORDER_TYPE`].
pub fn order_type_hash() -> B256 {
	keccak256(ORDER_TYPE)
}

/// EIP-712 struct hash of the generic order info.
pub fn hash_order_info(info: &OrderInfo) -> B256 {
	keccak256(
		(
			keccak256(ORDER_INFO_TYPE),
			info.reactor,
			info.swapper,
			info.nonce,
			info.deadline,
			info.additionalValidationContract,
			keccak256(&info.additionalValidationData),
		)
			.abi_encode(),
	)
}

/// EIP-712 struct hash of a single Dutch output.
pub fn hash_dutch_output(output: &DutchOutput) -> B256 {
	keccak256(
		(
			keccak256(DUTCH_OUTPUT_TYPE),
			output.token,
			output.startAmount,
			output.endAmount,
			output.recipient,
		)
			.abi_encode(),
	)
}

/// Hash of an output array: keccak over the packed element hashes.
pub fn hash_dutch_outputs(outputs: &[DutchOutput]) -> B256 {
	let mut packed = Vec::with_capacity(outputs.len() * 32);
	for output in outputs {
		packed.extend_from_slice(hash_dutch_output(output).as_slice());
	}
	keccak256(packed)
}

impl GladiusOrder {
	/// EIP-712 struct hash of the order as signed by the swapper.
	///
	/// Used as the replay key for fill events and as the Permit2 witness.
	pub fn hash(&self) -> B256 {
		keccak256(
			(
				order_type_hash(),
				hash_order_info(&self.info),
				self.decayStartTime,
				self.decayEndTime,
				self.exclusiveFiller,
				self.exclusivityOverrideBps,
				self.input.token,
				self.input.startAmount,
				self.input.endAmount,
				hash_dutch_outputs(&self.outputs),
				self.fillThreshold,
			)
				.abi_encode(),
		)
	}
}
