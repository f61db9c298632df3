//! EIP-712 digests for Permit2 signature transfers with a witness.
//!
//! The swapper signs a `PermitWitnessTransferFrom` whose witness is the
//! Gladius order hash. The reactor is the spender, so a signature can only be
//! redeemed by the reactor named in the order.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolValue};
use gladius_types::{GladiusOrder, PERMIT2_ORDER_TYPE, TOKEN_PERMISSIONS_TYPE};
use serde::{Deserialize, Serialize};

sol! {
	/// Token and maximum amount a permit authorises.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct TokenPermissions {
		address token;
		uint256 amount;
	}

	/// Signed single-token transfer permit.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct PermitTransferFrom {
		TokenPermissions permitted;
		uint256 nonce;
		uint256 deadline;
	}

	/// Where the spender sends the tokens and how many.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct SignatureTransferDetails {
		address to;
		uint256 requestedAmount;
	}
}

/// Name in the Permit2 EIP-712 domain.
pub const PERMIT2_DOMAIN_NAME: &str = "Permit2";

/// Permit2's domain omits the version field.
pub const EIP712_DOMAIN_TYPE: &str =
	"EIP712Domain(string name,uint256 chainId,address verifyingContract)";

/// Prefix of the permit type; the witness type string completes it.
pub const PERMIT_WITNESS_TRANSFER_FROM_TYPE_STUB: &str = concat!(
	"PermitWitnessTransferFrom(",
	"TokenPermissions permitted,",
	"address spender,",
	"uint256 nonce,",
	"uint256 deadline,"
);

pub fn domain_separator(chain_id: u64, verifying_contract: Address) -> B256 {
	keccak256(
		(
			keccak256(EIP712_DOMAIN_TYPE),
			keccak256(PERMIT2_DOMAIN_NAME),
			U256::from(chain_id),
			verifying_contract,
		)
			.abi_encode(),
	)
}

pub fn hash_token_permissions(permitted: &TokenPermissions) -> B256 {
	keccak256(
		(
			keccak256(TOKEN_PERMISSIONS_TYPE),
			permitted.token,
			permitted.amount,
		)
			.abi_encode(),
	)
}

/// Struct hash of a witness permit.
pub fn hash_with_witness(
	permit: &PermitTransferFrom,
	spender: Address,
	witness: B256,
	witness_type_string: &str,
) -> B256 {
	let type_hash = keccak256(format!(
		"{PERMIT_WITNESS_TRANSFER_FROM_TYPE_STUB}{witness_type_string}"
	));
	keccak256(
		(
			type_hash,
			hash_token_permissions(&permit.permitted),
			spender,
			permit.nonce,
			permit.deadline,
			witness,
		)
			.abi_encode(),
	)
}

/// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
pub fn typed_data_hash(domain_separator: B256, struct_hash: B256) -> B256 {
	let mut buf = [0u8; 66];
	buf[0] = 0x19;
	buf[1] = 0x01;
	buf[2..34].copy_from_slice(domain_separator.as_slice());
	buf[34..].copy_from_slice(struct_hash.as_slice());
	keccak256(buf)
}

/// Permit a swapper grants for `order`: the input token up to its largest
/// decayed amount, keyed by the order nonce and deadline.
pub fn order_permit(order: &GladiusOrder) -> PermitTransferFrom {
	PermitTransferFrom {
		permitted: TokenPermissions {
			token: order.input.token,
			amount: order.input.startAmount.max(order.input.endAmount),
		},
		nonce: order.info.nonce,
		deadline: order.info.deadline,
	}
}

/// Digest the swapper signs to authorise `order`.
pub fn order_digest(order: &GladiusOrder, domain_separator: B256) -> B256 {
	let struct_hash = hash_with_witness(
		&order_permit(order),
		order.info.reactor,
		order.hash(),
		PERMIT2_ORDER_TYPE,
	);
	typed_data_hash(domain_separator, struct_hash)
}
