//! # Ports
//!
//! Hexagonal architecture ports: the factory API and its collaborators.

pub mod inbound;
pub mod outbound;

pub use inbound::NetworkFactoryApi;
pub use outbound::{ChainContext, ComponentDeployer, DeployRequest, FactoryEventPublisher, TokenRequest};
