//! Reactor events and the broadcast bus that carries them.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the settlement reactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactorEvent {
	/// An order was filled, fully or partially.
	Fill {
		order_hash: B256,
		filler: Address,
		swapper: Address,
		nonce: U256,
	},
}

/// Broadcast bus for reactor events.
///
/// Every subscriber gets its own copy of each event. Cloning the bus shares
/// the underlying channel, so a reactor and its observers can hold separate
/// handles.
pub struct EventBus {
	/// Sending half of the broadcast channel; receivers are created on demand.
	sender: broadcast::Sender<ReactorEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events.
	///
	/// A subscriber that falls more than `capacity` events behind loses the
	/// oldest ones and sees a lag error on its next receive.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Subscribes to events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<ReactorEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to current subscribers.
	///
	/// Having no subscribers is not an error; the event is dropped.
	pub fn publish(&self, event: ReactorEvent) {
		let _ = self.sender.send(event);
	}
}

/// Clones share one channel.
impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}

/// A bus with room for 1024 buffered events.
impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_subscriber_receives_fill() {
		let bus = EventBus::new(8);
		let mut rx = bus.subscribe();
		let event = ReactorEvent::Fill {
			order_hash: B256::repeat_byte(1),
			filler: Address::repeat_byte(2),
			swapper: Address::repeat_byte(3),
			nonce: U256::from(4),
		};

		bus.publish(event.clone());
		assert_eq!(rx.recv().await.unwrap(), event);
	}

	#[test]
	fn test_publish_without_subscribers_is_silent() {
		let bus = EventBus::new(1);
		bus.publish(ReactorEvent::Fill {
			order_hash: B256::ZERO,
			filler: Address::ZERO,
			swapper: Address::ZERO,
			nonce: U256::ZERO,
		});
	}

	#[tokio::test]
	async fn test_clones_share_channel_and_late_subscribers_miss_old_events() {
		let bus = EventBus::new(8);
		let publisher = bus.clone();
		let fill = |n: u64| ReactorEvent::Fill {
			order_hash: B256::ZERO,
			filler: Address::ZERO,
			swapper: Address::ZERO,
			nonce: U256::from(n),
		};

		publisher.publish(fill(1));
		let mut rx = bus.subscribe();
		publisher.publish(fill(2));

		assert_eq!(rx.recv().await.unwrap(), fill(2));
		assert!(rx.try_recv().is_err());
	}
}
