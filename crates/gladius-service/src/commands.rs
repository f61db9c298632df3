//! Subcommand implementations.
//!
//! Each command returns a serializable value; `main` prints it as JSON.

use std::path::Path;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::{Context, Result};
use gladius_config::GladiusConfig;
use gladius_fees::{create_fee_controller, FeeControllerInterface};
use gladius_order::OrderResolver;
use gladius_permit::{
	digest::{domain_separator, order_digest},
	LocalSigner, MemoryPermit2,
};
use gladius_reactor::{GladiusReactor, OrderQuoter};
use gladius_types::{GladiusOrder, ResolvedOrder, SignedOrder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

/// Identifiers of an order as the reactor and Permit2 see it.
#[derive(Debug, Serialize)]
pub struct OrderHashes {
	pub order_hash: B256,
	pub permit_digest: B256,
	pub encoded: Bytes,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let content = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub async fn read_order(path: &Path) -> Result<GladiusOrder> {
	read_json(path).await
}

pub async fn read_signed_order(path: &Path) -> Result<SignedOrder> {
	read_json(path).await
}

fn permit2_domain(config: &GladiusConfig) -> B256 {
	domain_separator(config.reactor.chain_id, config.reactor.permit2)
}

fn fee_controller(config: &GladiusConfig) -> Result<Option<Arc<dyn FeeControllerInterface>>> {
	let Some(fees) = config.fees.as_ref().filter(|f| f.enabled) else {
		return Ok(None);
	};
	let controller = create_fee_controller(&fees.controller_config())
		.context("Failed to create fee controller")?;
	Ok(Some(Arc::from(controller)))
}

pub fn hash_order(config: &GladiusConfig, order: &GladiusOrder) -> OrderHashes {
	OrderHashes {
		order_hash: order.hash(),
		permit_digest: order_digest(order, permit2_domain(config)),
		encoded: order.encode(),
	}
}

/// Resolves an unsigned order, with fees when the config enables them.
pub fn resolve_order(
	config: &GladiusConfig,
	order: &GladiusOrder,
	quantity: Option<U256>,
	filler: Address,
	now: u64,
) -> Result<ResolvedOrder> {
	let resolver = OrderResolver::new(fee_controller(config)?);
	let signed = order.sign_with(Bytes::new());
	let resolved = resolver
		.resolve_with_fees(&signed, quantity, filler, now)
		.context("Failed to resolve order")?;
	info!(order_hash = %resolved.hash, input = %resolved.input.amount, "Resolved order");
	Ok(resolved)
}

pub fn sign_order(config: &GladiusConfig, order: &GladiusOrder, key: &str) -> Result<SignedOrder> {
	let signer = LocalSigner::new(key)?;
	if signer.address() != order.info.swapper {
		anyhow::bail!(
			"Key belongs to {} but the order swapper is {}",
			signer.address(),
			order.info.swapper
		);
	}
	let signed = signer.sign_order(order, permit2_domain(config))?;
	info!(order_hash = %order.hash(), swapper = %signer.address(), "Signed order");
	Ok(signed)
}

/// Runs a signed order through the reactor against a scratch ledger in which
/// the swapper holds exactly the permitted input amount.
pub async fn quote_order(
	config: &GladiusConfig,
	signed: &SignedOrder,
	quantity: Option<U256>,
	filler: Address,
	now: u64,
) -> Result<ResolvedOrder> {
	let order = GladiusOrder::decode(&signed.order)?;
	let ledger = Arc::new(MemoryPermit2::new(
		config.reactor.chain_id,
		config.reactor.permit2,
	));
	let permitted = order.input.startAmount.max(order.input.endAmount);
	ledger
		.mint(order.input.token, order.info.swapper, permitted)
		.await;
	debug!(swapper = %order.info.swapper, %permitted, "Funded scratch ledger");

	let mut reactor = GladiusReactor::new(config.reactor.address, config.reactor.owner, ledger)
		.with_clock(Arc::new(move || now));
	if let Some(controller) = fee_controller(config)? {
		reactor = reactor.with_fee_controller(controller);
	}

	let resolved = OrderQuoter::new(Arc::new(reactor))
		.quote(signed.order.clone(), signed.sig.clone(), quantity, filler)
		.await
		.context("Quote failed")?;
	info!(order_hash = %resolved.hash, input = %resolved.input.amount, "Quoted order");
	Ok(resolved)
}

#[cfg(test)]
mod tests {
	use super::*;
	use gladius_config::parse_config;
	use gladius_types::{DutchInput, DutchOutput, OrderInfo};
	use std::io::Write;
	use tempfile::NamedTempFile;

	const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const NOW: u64 = 1_700_000_000;
	const REACTOR: Address = Address::new([0x11; 20]);
	const TOKEN_IN: Address = Address::new([0xaa; 20]);
	const TOKEN_OUT: Address = Address::new([0xbb; 20]);
	const FEE_RECIPIENT: Address = Address::new([0x02; 20]);

	fn config(fees_enabled: bool) -> GladiusConfig {
		parse_config(&format!(
			r#"
[reactor]
address = "{REACTOR}"
chain_id = 1

[fees]
enabled = {fees_enabled}
owner = "0x0101010101010101010101010101010101010101"
fee_recipient = "{FEE_RECIPIENT}"
base_fee = 5
"#
		))
		.unwrap()
	}

	fn order(swapper: Address) -> GladiusOrder {
		GladiusOrder {
			info: OrderInfo {
				reactor: REACTOR,
				swapper,
				nonce: U256::from(7),
				deadline: U256::from(NOW + 1_000),
				additionalValidationContract: Address::ZERO,
				additionalValidationData: Bytes::new(),
			},
			decayStartTime: U256::from(NOW),
			decayEndTime: U256::from(NOW + 100),
			exclusiveFiller: Address::ZERO,
			exclusivityOverrideBps: U256::ZERO,
			input: DutchInput {
				token: TOKEN_IN,
				startAmount: U256::from(1_000_000),
				endAmount: U256::from(1_000_000),
			},
			outputs: vec![DutchOutput {
				token: TOKEN_OUT,
				startAmount: U256::from(2_000_000),
				endAmount: U256::from(1_000_000),
				recipient: swapper,
			}],
			fillThreshold: U256::ZERO,
		}
	}

	fn swapper() -> Address {
		LocalSigner::new(KEY).unwrap().address()
	}

	fn write_json<T: Serialize>(value: &T) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(serde_json::to_string(value).unwrap().as_bytes())
			.unwrap();
		file
	}

	#[tokio::test]
	async fn test_read_order_from_json() {
		let order = order(swapper());
		let file = write_json(&order);
		assert_eq!(read_order(file.path()).await.unwrap(), order);

		let missing = read_order(Path::new("/nonexistent/order.json")).await;
		assert!(missing.is_err());
	}

	#[test]
	fn test_hash_order_matches_permit_digest() {
		let config = config(false);
		let order = order(swapper());
		let hashes = hash_order(&config, &order);

		assert_eq!(hashes.order_hash, order.hash());
		assert_eq!(
			hashes.permit_digest,
			order_digest(&order, domain_separator(1, config.reactor.permit2))
		);
		assert_eq!(GladiusOrder::decode(&hashes.encoded).unwrap(), order);
	}

	#[test]
	fn test_resolve_midway_with_fees() {
		let order = order(swapper());
		let resolved = resolve_order(&config(true), &order, None, Address::ZERO, NOW + 50).unwrap();

		assert_eq!(resolved.input.amount, U256::from(1_000_000));
		assert_eq!(resolved.outputs[0].amount, U256::from(1_500_000));
		// 5 / 100_000 of the output
		assert_eq!(resolved.outputs.len(), 2);
		assert_eq!(resolved.outputs[1].amount, U256::from(75));
		assert_eq!(resolved.outputs[1].recipient, FEE_RECIPIENT);
	}

	#[test]
	fn test_resolve_partial_without_fees() {
		let order = order(swapper());
		let resolved = resolve_order(
			&config(false),
			&order,
			Some(U256::from(250_000)),
			Address::ZERO,
			NOW,
		)
		.unwrap();

		assert_eq!(resolved.input.amount, U256::from(250_000));
		assert_eq!(resolved.outputs.len(), 1);
		assert_eq!(resolved.outputs[0].amount, U256::from(500_000));
	}

	#[test]
	fn test_resolve_surfaces_order_errors() {
		let mut order = order(swapper());
		order.decayEndTime = U256::from(NOW + 2_000);
		assert!(resolve_order(&config(false), &order, None, Address::ZERO, NOW).is_err());
	}

	#[test]
	fn test_sign_rejects_foreign_order() {
		let order = order(Address::new([0x03; 20]));
		assert!(sign_order(&config(false), &order, KEY).is_err());
		assert!(sign_order(&config(false), &order, "not a key").is_err());
	}

	#[tokio::test]
	async fn test_sign_then_quote() {
		let config = config(true);
		let order = order(swapper());
		let signed = sign_order(&config, &order, KEY).unwrap();

		let file = write_json(&signed);
		let signed = read_signed_order(file.path()).await.unwrap();

		let resolved = quote_order(&config, &signed, Some(U256::from(500_000)), Address::ZERO, NOW)
			.await
			.unwrap();
		assert_eq!(resolved.hash, order.hash());
		assert_eq!(resolved.input.amount, U256::from(500_000));
		assert_eq!(resolved.outputs[0].amount, U256::from(1_000_000));
		assert_eq!(resolved.outputs[1].amount, U256::from(50));
	}

	#[tokio::test]
	async fn test_quote_rejects_other_chain_signature() {
		let order = order(swapper());
		let signed = sign_order(&config(false), &order, KEY).unwrap();

		let mut other_chain = config(false);
		other_chain.reactor.chain_id = 10;
		let result = quote_order(&other_chain, &signed, None, Address::ZERO, NOW).await;
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_quote_after_deadline_fails() {
		let config = config(false);
		let order = order(swapper());
		let signed = sign_order(&config, &order, KEY).unwrap();

		let result = quote_order(&config, &signed, None, Address::ZERO, NOW + 1_001).await;
		assert!(result.is_err());
	}
}
