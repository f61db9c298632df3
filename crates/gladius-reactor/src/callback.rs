//! Filler callback invoked between input and output transfers.

use alloy_primitives::Bytes;
use async_trait::async_trait;
use gladius_types::ResolvedOrder;

/// Implemented by fillers that need the swappers' inputs in hand before
/// they can source the outputs.
///
/// The reactor has already moved every input to the filler when this runs
/// and pulls the outputs from the filler right after it returns.
#[async_trait]
pub trait FillCallback: Send + Sync {
	async fn reactor_callback(&self, orders: &[ResolvedOrder], data: &Bytes) -> Result<(), String>;
}
