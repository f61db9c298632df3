//! Order resolution pipeline.
//!
//! A signed order moves through [`ResolutionStage`]s in a fixed order. Each
//! stage either produces the input of the next one or aborts the whole
//! resolution; nothing partial ever escapes.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use gladius_fees::FeeControllerInterface;
use gladius_types::{GladiusOrder, ResolvedOrder, SignedOrder};
use tracing::debug;

use crate::{
	decay::{decay_input, decay_outputs},
	exclusivity::apply_override,
	fees::apply_fee_controller,
	partition::partition,
	OrderError, Result,
};

/// Stages an order passes through while being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionStage {
	Unvalidated,
	Decayed,
	Partitioned,
	FeeInjected,
	Final,
}

impl fmt::Display for ResolutionStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ResolutionStage::Unvalidated => "unvalidated",
			ResolutionStage::Decayed => "decayed",
			ResolutionStage::Partitioned => "partitioned",
			ResolutionStage::FeeInjected => "fee_injected",
			ResolutionStage::Final => "final",
		};
		f.write_str(name)
	}
}

/// Resolves signed Gladius orders into concrete fill amounts.
///
/// The resolver holds no mutable state. The optional fee controller is an
/// injected handle so several resolvers can share one fee table.
#[derive(Clone, Default)]
pub struct OrderResolver {
	fee_controller: Option<Arc<dyn FeeControllerInterface>>,
}

impl OrderResolver {
	pub fn new(fee_controller: Option<Arc<dyn FeeControllerInterface>>) -> Self {
		Self { fee_controller }
	}

	/// Structural checks that do not depend on time or quantity.
	pub fn validate_order(order: &GladiusOrder) -> Result<()> {
		if order.outputs.len() != 1 {
			return Err(OrderError::InvalidOutLength);
		}
		if order.info.deadline < order.decayEndTime {
			return Err(OrderError::DeadlineBeforeEndTime);
		}
		if order.decayEndTime < order.decayStartTime {
			return Err(OrderError::OrderEndTimeBeforeStartTime);
		}
		if order.input_decays() && order.outputs_decay() {
			return Err(OrderError::InputAndOutputDecay);
		}
		Ok(())
	}

	/// Resolves `signed` for `filler` at `now`, without fees.
	///
	/// `quantity` is measured in the input token; `None` fills the whole
	/// currently decayed input amount.
	pub fn resolve(
		&self,
		signed: &SignedOrder,
		quantity: Option<U256>,
		filler: Address,
		now: u64,
	) -> Result<ResolvedOrder> {
		let order = GladiusOrder::decode(&signed.order)
			.map_err(|e| OrderError::InvalidOrderEncoding(e.to_string()))?;
		let hash = order.hash();
		debug!(order_hash = %hash, stage = %ResolutionStage::Unvalidated, "Resolving order");

		Self::validate_order(&order)?;

		let now = U256::from(now);
		let input = decay_input(&order.input, order.decayStartTime, order.decayEndTime, now)?;
		let outputs = decay_outputs(&order.outputs, order.decayStartTime, order.decayEndTime, now)?;
		debug!(
			order_hash = %hash,
			stage = %ResolutionStage::Decayed,
			input_amount = %input.amount,
			output_amount = %outputs[0].amount,
			"Applied decay"
		);

		let quantity = quantity.unwrap_or(input.amount);
		let (input, outputs) = partition(quantity, input, outputs, order.fillThreshold)?;
		let outputs = apply_override(
			outputs,
			order.exclusiveFiller,
			order.decayStartTime,
			order.exclusivityOverrideBps,
			filler,
			now,
		)?;
		debug!(
			order_hash = %hash,
			stage = %ResolutionStage::Partitioned,
			%quantity,
			spend = %outputs[0].amount,
			"Partitioned order"
		);

		Ok(ResolvedOrder {
			info: order.info,
			input,
			outputs,
			sig: signed.sig.clone(),
			hash,
		})
	}

	/// Appends the fee controller's outputs, if any controller is set.
	pub fn inject_fees(&self, order: ResolvedOrder) -> Result<ResolvedOrder> {
		let order = apply_fee_controller(order, self.fee_controller.as_deref())?;
		debug!(
			order_hash = %order.hash,
			stage = %ResolutionStage::FeeInjected,
			outputs = order.outputs.len(),
			"Injected fees"
		);
		Ok(order)
	}

	/// Full pipeline: resolve, then inject fees.
	pub fn resolve_with_fees(
		&self,
		signed: &SignedOrder,
		quantity: Option<U256>,
		filler: Address,
		now: u64,
	) -> Result<ResolvedOrder> {
		let resolved = self.resolve(signed, quantity, filler, now)?;
		let resolved = self.inject_fees(resolved)?;
		debug!(order_hash = %resolved.hash, stage = %ResolutionStage::Final, "Order resolved");
		Ok(resolved)
	}
}

impl fmt::Debug for OrderResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OrderResolver")
			.field("fee_controller", &self.fee_controller.is_some())
			.finish()
	}
}
