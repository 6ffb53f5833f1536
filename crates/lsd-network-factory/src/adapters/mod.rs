//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod chain;
pub mod deployer;
pub mod event_bus;

pub use chain::{ManualChainContext, SystemChainContext};
pub use deployer::DeterministicDeployer;
pub use event_bus::{InMemoryFactoryBus, DEFAULT_CHANNEL_CAPACITY};
