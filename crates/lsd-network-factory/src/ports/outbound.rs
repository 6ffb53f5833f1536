//! # Outbound Ports
//!
//! Traits for the factory's external collaborators: the component deployer,
//! the chain clock and the event bus.

use crate::domain::entities::ComponentKind;
use crate::errors::DeployError;
use crate::events::EventEnvelope;
use async_trait::async_trait;
use lsd_shared_types::{Address, Hash};

/// Request to deploy one bundle component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployRequest {
    /// Deploying account (the factory).
    pub deployer: Address,
    /// Component kind.
    pub kind: ComponentKind,
    /// Logic template for proxied components.
    pub logic: Option<Address>,
    /// Per-network, per-kind salt.
    pub salt: Hash,
}

/// Request to mint a fresh identity token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequest {
    /// Deploying account (the factory).
    pub deployer: Address,
    /// Deployer nonce this mint consumes.
    pub nonce: u64,
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
}

/// Deploys components and tokens.
///
/// Implementations must not retain anything about a request they answered:
/// the factory may discard the result if a later step of the same creation
/// fails.
pub trait ComponentDeployer: Send + Sync {
    /// Deploy a component, returning its address.
    fn deploy(&self, request: &DeployRequest) -> Result<Address, DeployError>;

    /// Mint a token, returning its address.
    fn mint_token(&self, request: &TokenRequest) -> Result<Address, DeployError>;
}

/// Read-only view of the chain the factory runs on.
pub trait ChainContext: Send + Sync {
    /// Current block number.
    fn block_number(&self) -> u64;

    /// Current timestamp in seconds.
    fn timestamp(&self) -> u64;
}

/// Sink for committed factory events.
#[async_trait]
pub trait FactoryEventPublisher: Send + Sync {
    /// Publish an event. Returns the number of subscribers reached.
    async fn publish(&self, envelope: EventEnvelope) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}
