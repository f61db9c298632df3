//! The Gladius reactor.
//!
//! Every entry point runs the same fill routine:
//!
//! 1. take the reentrancy lock and open a ledger checkpoint,
//! 2. move the attached native value from the filler to the reactor,
//! 3. resolve each order (decay, partition, exclusivity, fees) and validate it,
//! 4. redeem each swapper's permit for the resolved input, paid to the filler,
//! 5. run the filler's callback, if any,
//! 6. pay each output from the filler (native outputs from the reactor balance),
//! 7. refund leftover native currency to the filler and commit.
//!
//! Any failure rolls the ledger back to the checkpoint. `Fill` events are
//! published only once the checkpoint is committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, Bytes, U256};
use arc_swap::ArcSwap;
use gladius_fees::FeeControllerInterface;
use gladius_order::OrderResolver;
use gladius_permit::{
	PermitTransferFrom, PermitWitnessTransfer, SignatureTransferDetails, TokenPermissions,
	TransferInterface,
};
use gladius_types::{EventBus, ReactorEvent, ResolvedOrder, SignedOrder, PERMIT2_ORDER_TYPE};
use tracing::{debug, error, info, warn};

use crate::{FillCallback, ReactorError, ValidationCallback, ValidationRegistry};

/// Source of the current unix timestamp in seconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn system_clock() -> Clock {
	Arc::new(|| {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or_default()
	})
}

/// Releases the reentrancy lock when dropped.
struct LockGuard<'a>(&'a AtomicBool);

impl Drop for LockGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

pub struct GladiusReactor {
	address: Address,
	owner: Address,
	resolver: ArcSwap<OrderResolver>,
	transfer: Arc<dyn TransferInterface>,
	validators: ValidationRegistry,
	events: EventBus,
	clock: Clock,
	locked: AtomicBool,
}

impl GladiusReactor {
	/// Creates a reactor at `address`, administered by `owner`, without fees.
	pub fn new(address: Address, owner: Address, transfer: Arc<dyn TransferInterface>) -> Self {
		Self {
			address,
			owner,
			resolver: ArcSwap::from_pointee(OrderResolver::default()),
			transfer,
			validators: ValidationRegistry::new(),
			events: EventBus::default(),
			clock: system_clock(),
			locked: AtomicBool::new(false),
		}
	}

	pub fn with_fee_controller(self, controller: Arc<dyn FeeControllerInterface>) -> Self {
		self.resolver
			.store(Arc::new(OrderResolver::new(Some(controller))));
		self
	}

	pub fn with_validation(mut self, address: Address, callback: Arc<dyn ValidationCallback>) -> Self {
		self.validators.register(address, callback);
		self
	}

	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;
		self
	}

	pub fn with_event_bus(mut self, events: EventBus) -> Self {
		self.events = events;
		self
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Replaces the protocol fee controller. Owner only; `None` disables fees.
	pub fn set_fee_controller(
		&self,
		caller: Address,
		controller: Option<Arc<dyn FeeControllerInterface>>,
	) -> Result<(), ReactorError> {
		if caller != self.owner {
			return Err(ReactorError::Unauthorized(caller));
		}
		let enabled = controller.is_some();
		self.resolver.store(Arc::new(OrderResolver::new(controller)));
		info!(enabled, "Protocol fee controller updated");
		Ok(())
	}

	/// Fills `order` completely.
	pub async fn execute(
		&self,
		filler: Address,
		value: U256,
		order: SignedOrder,
	) -> Result<ResolvedOrder, ReactorError> {
		let mut filled = self.fill(filler, value, vec![order], None, None).await?;
		Ok(filled.remove(0))
	}

	/// Fills `quantity` of `order`'s input.
	pub async fn execute_with_quantity(
		&self,
		filler: Address,
		value: U256,
		order: SignedOrder,
		quantity: U256,
	) -> Result<ResolvedOrder, ReactorError> {
		let mut filled = self
			.fill(filler, value, vec![order], Some(vec![quantity]), None)
			.await?;
		Ok(filled.remove(0))
	}

	pub async fn execute_batch(
		&self,
		filler: Address,
		value: U256,
		orders: Vec<SignedOrder>,
	) -> Result<Vec<ResolvedOrder>, ReactorError> {
		self.fill(filler, value, orders, None, None).await
	}

	/// Fills `quantities[i]` of each `orders[i]`.
	pub async fn execute_batch_with_quantities(
		&self,
		filler: Address,
		value: U256,
		orders: Vec<SignedOrder>,
		quantities: Vec<U256>,
	) -> Result<Vec<ResolvedOrder>, ReactorError> {
		self.fill(filler, value, orders, Some(quantities), None)
			.await
	}

	pub async fn execute_with_callback(
		&self,
		filler: Address,
		value: U256,
		order: SignedOrder,
		callback: &dyn FillCallback,
		data: Bytes,
	) -> Result<ResolvedOrder, ReactorError> {
		let mut filled = self
			.fill(filler, value, vec![order], None, Some((callback, data)))
			.await?;
		Ok(filled.remove(0))
	}

	pub async fn execute_batch_with_callback(
		&self,
		filler: Address,
		value: U256,
		orders: Vec<SignedOrder>,
		callback: &dyn FillCallback,
		data: Bytes,
	) -> Result<Vec<ResolvedOrder>, ReactorError> {
		self.fill(filler, value, orders, None, Some((callback, data)))
			.await
	}

	/// Resolves and validates `order` for `filler` and checks that its permit
	/// would redeem, then discards every ledger change.
	pub async fn quote(
		&self,
		filler: Address,
		order: &SignedOrder,
		quantity: Option<U256>,
	) -> Result<ResolvedOrder, ReactorError> {
		let _guard = self.lock()?;
		self.transfer.checkpoint().await;

		let now = (self.clock)();
		let result = async {
			let resolved = self.resolve(order, quantity, filler, now)?;
			self.redeem_input(&resolved, filler, now).await?;
			Ok::<_, ReactorError>(resolved)
		}
		.await;

		match (result, self.transfer.rollback().await) {
			(Err(e), Err(rollback)) => {
				error!(error = %rollback, "Rollback failed after quote error");
				Err(e)
			}
			(Ok(_), Err(rollback)) => Err(rollback.into()),
			(result, Ok(())) => result,
		}
	}

	fn lock(&self) -> Result<LockGuard<'_>, ReactorError> {
		self.locked
			.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
			.map_err(|_| ReactorError::Reentrancy)?;
		Ok(LockGuard(&self.locked))
	}

	async fn fill(
		&self,
		filler: Address,
		value: U256,
		orders: Vec<SignedOrder>,
		quantities: Option<Vec<U256>>,
		callback: Option<(&dyn FillCallback, Bytes)>,
	) -> Result<Vec<ResolvedOrder>, ReactorError> {
		let _guard = self.lock()?;
		self.transfer.checkpoint().await;

		match self
			.settle(filler, value, &orders, quantities.as_deref(), callback)
			.await
		{
			Ok(resolved) => {
				self.transfer.commit().await?;
				for order in &resolved {
					info!(
						order_hash = %order.hash,
						%filler,
						swapper = %order.info.swapper,
						input = %order.input.amount,
						"Order filled"
					);
					self.events.publish(ReactorEvent::Fill {
						order_hash: order.hash,
						filler,
						swapper: order.info.swapper,
						nonce: order.info.nonce,
					});
				}
				Ok(resolved)
			}
			Err(e) => {
				warn!(%filler, error = %e, "Fill failed, rolling back");
				if let Err(rollback) = self.transfer.rollback().await {
					error!(%filler, error = %rollback, "Rollback failed");
				}
				Err(e)
			}
		}
	}

	async fn settle(
		&self,
		filler: Address,
		value: U256,
		orders: &[SignedOrder],
		quantities: Option<&[U256]>,
		callback: Option<(&dyn FillCallback, Bytes)>,
	) -> Result<Vec<ResolvedOrder>, ReactorError> {
		if let Some(quantities) = quantities {
			if quantities.len() != orders.len() {
				return Err(ReactorError::QuantityLengthMismatch {
					orders: orders.len(),
					quantities: quantities.len(),
				});
			}
		}

		if !value.is_zero() {
			self.transfer
				.transfer_native(filler, self.address, value)
				.await?;
		}

		let now = (self.clock)();
		let resolver = self.resolver.load_full();
		let resolved = orders
			.iter()
			.enumerate()
			.map(|(i, order)| {
				let quantity = quantities.map(|q| q[i]);
				let resolved = resolver.resolve_with_fees(order, quantity, filler, now)?;
				self.validate(&resolved, filler, now)?;
				Ok(resolved)
			})
			.collect::<Result<Vec<_>, ReactorError>>()?;

		for order in &resolved {
			self.redeem_input(order, filler, now).await?;
		}

		if let Some((callback, data)) = callback {
			callback
				.reactor_callback(&resolved, &data)
				.await
				.map_err(ReactorError::CallbackFailed)?;
		}

		for order in &resolved {
			self.pay_outputs(order, filler).await?;
		}

		let leftover = self.transfer.balance_of(Address::ZERO, self.address).await;
		if !leftover.is_zero() {
			debug!(%leftover, "Refunding native balance");
			self.transfer
				.transfer_native(self.address, filler, leftover)
				.await?;
		}

		Ok(resolved)
	}

	/// Resolves without touching the ledger.
	fn resolve(
		&self,
		order: &SignedOrder,
		quantity: Option<U256>,
		filler: Address,
		now: u64,
	) -> Result<ResolvedOrder, ReactorError> {
		let resolved = self
			.resolver
			.load()
			.resolve_with_fees(order, quantity, filler, now)?;
		self.validate(&resolved, filler, now)?;
		Ok(resolved)
	}

	fn validate(&self, order: &ResolvedOrder, filler: Address, now: u64) -> Result<(), ReactorError> {
		if order.info.reactor != self.address {
			return Err(ReactorError::InvalidReactor(order.info.reactor));
		}
		if U256::from(now) > order.info.deadline {
			return Err(ReactorError::DeadlinePassed);
		}

		let contract = order.info.additionalValidationContract;
		if contract != Address::ZERO {
			let callback = self
				.validators
				.get(&contract)
				.ok_or(ReactorError::UnknownValidationContract(contract))?;
			callback
				.validate(filler, order, now)
				.map_err(ReactorError::AdditionalValidationFailed)?;
		}
		Ok(())
	}

	async fn redeem_input(
		&self,
		order: &ResolvedOrder,
		filler: Address,
		now: u64,
	) -> Result<(), ReactorError> {
		let request = PermitWitnessTransfer {
			permit: PermitTransferFrom {
				permitted: TokenPermissions {
					token: order.input.token,
					amount: order.input.max_amount,
				},
				nonce: order.info.nonce,
				deadline: order.info.deadline,
			},
			transfer: SignatureTransferDetails {
				to: filler,
				requestedAmount: order.input.amount,
			},
			owner: order.info.swapper,
			spender: self.address,
			witness: order.hash,
			witness_type_string: PERMIT2_ORDER_TYPE.to_string(),
			signature: order.sig.clone(),
		};
		self.transfer
			.permit_witness_transfer_from(request, now)
			.await?;
		Ok(())
	}

	async fn pay_outputs(&self, order: &ResolvedOrder, filler: Address) -> Result<(), ReactorError> {
		for output in &order.outputs {
			if output.is_native() {
				self.transfer
					.transfer_native(self.address, output.recipient, output.amount)
					.await?;
			} else {
				self.transfer
					.transfer_from(
						output.token,
						filler,
						output.recipient,
						output.amount,
						self.address,
					)
					.await?;
			}
		}
		Ok(())
	}
}
