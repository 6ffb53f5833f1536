//! # Event Schema
//!
//! Records published by the factory after an operation commits.
//!
//! Events are emitted only after state is committed, so a subscriber never
//! observes an event for a creation that was rolled back. The caller is taken
//! from the operation envelope and copied into the payload as `creator`; no
//! payload field is ever read back as an identity.

use crate::domain::entities::{InstanceBundle, LogicTemplates};
use lsd_shared_types::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event topics.
pub mod topics {
    /// A network bundle was created.
    pub const NETWORK_CREATED: &str = "factory.network.created";
    /// Factory initialized.
    pub const FACTORY_INITIALIZED: &str = "factory.initialized";
    /// Authorized token list changed.
    pub const AUTHORIZED_TOKENS: &str = "factory.tokens.authorized";
    /// Entrusted voter set replaced.
    pub const ENTRUSTED_VOTERS: &str = "factory.voters.entrusted";
    /// Factory admin changed.
    pub const ADMIN: &str = "factory.admin";
    /// Logic templates replaced.
    pub const LOGIC_TEMPLATES: &str = "factory.logic_templates";
    /// A network's voter set was replaced by its own governance.
    pub const VOTERS_UPDATED: &str = "network.governance.voters_updated";
}

/// Payload of `factory.network.created`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCreatedPayload {
    /// Backing token.
    pub token: Address,
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Identity that requested creation.
    pub creator: Address,
    /// Network admin.
    pub admin: Address,
    /// Initial voter set.
    pub voters: Vec<Address>,
    /// Initial threshold.
    pub threshold: usize,
    /// Governance component.
    pub governance: Address,
    /// Fee pool component.
    pub fee_pool: Address,
    /// Network balances component.
    pub network_balances: Address,
    /// Node deposit component.
    pub node_deposit: Address,
    /// User deposit component.
    pub user_deposit: Address,
    /// Network withdraw component.
    pub network_withdraw: Address,
    /// Timelock controller, if any.
    pub timelock: Option<Address>,
    /// Whether the token was minted by the factory.
    pub minted: bool,
    /// Block of the creation.
    pub block: u64,
}

impl NetworkCreatedPayload {
    /// Build the payload for a committed bundle.
    pub fn from_bundle(bundle: &InstanceBundle, voters: Vec<Address>, threshold: usize, minted: bool) -> Self {
        Self {
            token: bundle.token.address,
            name: bundle.token.name.clone(),
            symbol: bundle.token.symbol.clone(),
            creator: bundle.creator,
            admin: bundle.admin,
            voters,
            threshold,
            governance: bundle.governance,
            fee_pool: bundle.fee_pool,
            network_balances: bundle.network_balances,
            node_deposit: bundle.node_deposit,
            user_deposit: bundle.user_deposit,
            network_withdraw: bundle.network_withdraw,
            timelock: bundle.timelock,
            minted,
            block: bundle.created_at_block,
        }
    }
}

/// Everything the factory publishes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum FactoryEvent {
    /// Factory initialized.
    FactoryInitialized {
        /// Initial admin
        admin: Address,
    },
    /// Network created.
    NetworkCreated(NetworkCreatedPayload),
    /// Token allowed to back a network.
    AuthorizedTokenAdded {
        /// Token address
        token: Address,
    },
    /// Token no longer allowed to back new networks.
    AuthorizedTokenRemoved {
        /// Token address
        token: Address,
    },
    /// Entrusted voter set replaced.
    EntrustedVotersSet {
        /// New voters
        voters: Vec<Address>,
        /// New threshold
        threshold: usize,
    },
    /// Factory admin changed.
    AdminTransferred {
        /// Previous admin
        previous: Address,
        /// New admin
        new_admin: Address,
    },
    /// Logic templates replaced.
    LogicTemplatesUpdated(LogicTemplates),
    /// Network voter set replaced through its own governance.
    VotersUpdated {
        /// Network token
        token: Address,
        /// New voters
        voters: Vec<Address>,
        /// New threshold
        threshold: usize,
        /// Epoch after the change
        epoch: u64,
    },
}

impl FactoryEvent {
    /// Topic this event is published on.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::FactoryInitialized { .. } => topics::FACTORY_INITIALIZED,
            Self::NetworkCreated(_) => topics::NETWORK_CREATED,
            Self::AuthorizedTokenAdded { .. } | Self::AuthorizedTokenRemoved { .. } => {
                topics::AUTHORIZED_TOKENS
            }
            Self::EntrustedVotersSet { .. } => topics::ENTRUSTED_VOTERS,
            Self::AdminTransferred { .. } => topics::ADMIN,
            Self::LogicTemplatesUpdated(_) => topics::LOGIC_TEMPLATES,
            Self::VotersUpdated { .. } => topics::VOTERS_UPDATED,
        }
    }
}

/// Envelope around a published event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique id.
    pub event_id: Uuid,
    /// Position in the factory's total order of committed operations.
    pub sequence: u64,
    /// Topic, duplicated from the event for routing.
    pub topic: String,
    /// The event.
    pub event: FactoryEvent,
}

impl EventEnvelope {
    /// Wrap `event` at `sequence`.
    pub fn new(sequence: u64, event: FactoryEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence,
            topic: event.topic().to_string(),
            event,
        }
    }
}
