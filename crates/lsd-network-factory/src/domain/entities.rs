//! # Domain Entities
//!
//! Tokens, component kinds, instance bundles and factory configuration.

use lsd_shared_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// IDENTITY TOKEN
// =============================================================================

/// The token backing one network. Its address is the network's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityToken {
    /// Token contract address.
    pub address: Address,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
}

impl IdentityToken {
    /// Create a token descriptor.
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

// =============================================================================
// COMPONENT KINDS
// =============================================================================

/// Every component a network bundle can contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Fee accounting.
    FeePool,
    /// Balance tracking.
    NetworkBalances,
    /// Threshold-voting governance.
    NetworkProposal,
    /// Operator-side deposits.
    NodeDeposit,
    /// User-side deposits.
    UserDeposit,
    /// Withdrawals.
    NetworkWithdraw,
    /// Time-delayed admin (timelock networks only).
    Timelock,
}

impl ComponentKind {
    /// The six components every bundle carries, in deployment order.
    pub const BUNDLE: [ComponentKind; 6] = [
        ComponentKind::FeePool,
        ComponentKind::NetworkBalances,
        ComponentKind::NetworkProposal,
        ComponentKind::NodeDeposit,
        ComponentKind::UserDeposit,
        ComponentKind::NetworkWithdraw,
    ];

    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeePool => "fee_pool",
            Self::NetworkBalances => "network_balances",
            Self::NetworkProposal => "network_proposal",
            Self::NodeDeposit => "node_deposit",
            Self::UserDeposit => "user_deposit",
            Self::NetworkWithdraw => "network_withdraw",
            Self::Timelock => "timelock",
        }
    }

    /// Proxied components resolve their logic through a template.
    pub fn is_proxied(&self) -> bool {
        !matches!(self, Self::Timelock)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LOGIC TEMPLATES
// =============================================================================

/// Logic template per proxied component. Opaque to the factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicTemplates {
    /// Fee pool logic.
    pub fee_pool: Address,
    /// Network balances logic.
    pub network_balances: Address,
    /// Network proposal logic.
    pub network_proposal: Address,
    /// Node deposit logic.
    pub node_deposit: Address,
    /// User deposit logic.
    pub user_deposit: Address,
    /// Network withdraw logic.
    pub network_withdraw: Address,
}

impl LogicTemplates {
    /// Template for `kind`; `None` for components deployed without one.
    pub fn for_kind(&self, kind: ComponentKind) -> Option<Address> {
        match kind {
            ComponentKind::FeePool => Some(self.fee_pool),
            ComponentKind::NetworkBalances => Some(self.network_balances),
            ComponentKind::NetworkProposal => Some(self.network_proposal),
            ComponentKind::NodeDeposit => Some(self.node_deposit),
            ComponentKind::UserDeposit => Some(self.user_deposit),
            ComponentKind::NetworkWithdraw => Some(self.network_withdraw),
            ComponentKind::Timelock => None,
        }
    }

    /// First component whose template is the zero address.
    pub fn first_missing(&self) -> Option<ComponentKind> {
        ComponentKind::BUNDLE
            .into_iter()
            .find(|kind| self.for_kind(*kind).map_or(true, |logic| logic.is_zero()))
    }
}

// =============================================================================
// INSTANCE BUNDLE
// =============================================================================

/// Addresses of one network's components. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceBundle {
    /// Backing token.
    pub token: IdentityToken,
    /// Identity that requested creation.
    pub creator: Address,
    /// Network admin (the timelock address for timelock networks).
    pub admin: Address,
    /// Governance (network proposal) component.
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
    /// Timelock controller, if the network was created with one.
    pub timelock: Option<Address>,
    /// Deposit target forwarded to the node deposit component.
    pub external_deposit_target: Address,
    /// Block of the creating operation.
    pub created_at_block: u64,
}

impl InstanceBundle {
    /// Address of the `kind` component, if the bundle has one.
    pub fn component(&self, kind: ComponentKind) -> Option<Address> {
        match kind {
            ComponentKind::FeePool => Some(self.fee_pool),
            ComponentKind::NetworkBalances => Some(self.network_balances),
            ComponentKind::NetworkProposal => Some(self.governance),
            ComponentKind::NodeDeposit => Some(self.node_deposit),
            ComponentKind::UserDeposit => Some(self.user_deposit),
            ComponentKind::NetworkWithdraw => Some(self.network_withdraw),
            ComponentKind::Timelock => self.timelock,
        }
    }

    /// Every deployed component with its kind.
    pub fn components(&self) -> Vec<(ComponentKind, Address)> {
        let mut out: Vec<(ComponentKind, Address)> = ComponentKind::BUNDLE
            .into_iter()
            .filter_map(|kind| self.component(kind).map(|addr| (kind, addr)))
            .collect();
        if let Some(timelock) = self.timelock {
            out.push((ComponentKind::Timelock, timelock));
        }
        out
    }
}

// =============================================================================
// COMPONENT RECORD
// =============================================================================

/// A deployed component after the bind step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Component kind.
    pub kind: ComponentKind,
    /// Component address.
    pub address: Address,
    /// Logic template it resolves through, if proxied.
    pub logic: Option<Address>,
    /// Token of the network it is bound to.
    pub network: Address,
}

// =============================================================================
// FACTORY CONFIG
// =============================================================================

/// Arguments to `initialize`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    /// Factory admin.
    pub admin: Address,
    /// External deposit target forwarded into every bundle.
    pub external_deposit_target: Address,
    /// Logic templates for proxied components.
    pub logic_templates: LogicTemplates,
}

/// Factory-wide configuration, owned exclusively by the factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Factory admin.
    pub admin: Address,
    /// External deposit target.
    pub external_deposit_target: Address,
    /// Logic templates used for new networks.
    pub logic_templates: LogicTemplates,
    /// Default voter set for entrusted creation.
    pub entrusted_voters: Vec<Address>,
    /// Threshold paired with `entrusted_voters`.
    pub entrusted_threshold: usize,
    /// Pre-existing tokens allowed to back a network, keyed by address.
    pub authorized_tokens: BTreeMap<Address, IdentityToken>,
}

impl FactoryConfig {
    /// Config right after `initialize`.
    pub fn from_params(params: InitializeParams) -> Self {
        Self {
            admin: params.admin,
            external_deposit_target: params.external_deposit_target,
            logic_templates: params.logic_templates,
            entrusted_voters: Vec::new(),
            entrusted_threshold: 0,
            authorized_tokens: BTreeMap::new(),
        }
    }

    /// Whether `caller` is the factory admin.
    pub fn is_admin(&self, caller: &Address) -> bool {
        self.admin == *caller
    }
}
