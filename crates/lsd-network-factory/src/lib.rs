//! # LSD Network Factory
//!
//! Provisions self-contained liquid staking networks on demand.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Each network is a fixed bundle of components (fee pool, network balances,
//! network proposal, node deposit, user deposit, network withdraw) backed by
//! one identity token and governed by an N-of-M voter set. The factory:
//!
//! - mints a fresh token or accepts an authorized pre-existing one
//! - deploys and binds the bundle in one atomic step
//! - records the network in a registry that is the sole authority on which
//!   tokens are used
//! - routes votes and timelocked admin actions to each network
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One network per token | `domain/registry.rs` - `Registry::record()` |
//! | Creator lists are append-only | `domain/registry.rs` - `Registry::record()` |
//! | Bundle addresses non-zero and distinct | `domain/invariants.rs` - `invariant_bundle_addresses()` |
//! | Creation is all-or-nothing | `service.rs` - `stage()` then `commit()` |
//! | Admin operations gated by caller | `service.rs` - `FactoryState::admin_config()` |
//!
//! ## Module Structure
//!
//! ```text
//! lsd-network-factory/
//! ├── domain/          # entities, registry, bundle builder, invariants
//! ├── ports/           # NetworkFactoryApi, ComponentDeployer, ChainContext, FactoryEventPublisher
//! ├── adapters/        # DeterministicDeployer, chain contexts, InMemoryFactoryBus
//! ├── events.rs        # FactoryEvent, EventEnvelope, topics
//! ├── config.rs        # FactoryServiceConfig
//! ├── metrics.rs       # Prometheus counters (feature = "metrics")
//! └── service.rs       # NetworkFactoryService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{DeterministicDeployer, InMemoryFactoryBus, ManualChainContext, SystemChainContext};
pub use config::FactoryServiceConfig;
pub use domain::{
    AdminSpec, ComponentKind, ComponentRecord, FactoryConfig, IdentityToken, InitializeParams,
    InstanceBundle, LogicTemplates, Registry,
};
pub use errors::{DeployError, FactoryError};
pub use events::{topics, EventEnvelope, FactoryEvent, NetworkCreatedPayload};
pub use ports::inbound::TimelockParams;
pub use ports::{ChainContext, ComponentDeployer, FactoryEventPublisher, NetworkFactoryApi};
pub use service::{FactoryStats, NetworkFactoryService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
