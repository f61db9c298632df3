//! Shared types for the Gladius settlement protocol.
//!
//! Holds the signed order layout, the resolved order handed to the transfer
//! layer, the EIP-712 hashing that binds the two together, and reactor events.

pub mod events;
pub mod hash;
pub mod order;

pub use events::*;
pub use hash::*;
pub use order::*;

/// Denominator for basis-point quantities.
pub const BPS: u64 = 10_000;
