//! # Bundle Construction
//!
//! Builds one network in two phases:
//!
//! ```text
//! deploy: every component gets an address (no links yet)
//!   bind: each component is recorded against the network token
//! ```
//!
//! Nothing here touches the registry. The result is a `StagedNetwork` that the
//! service commits in one step, or drops on any failure.

use crate::domain::entities::{
    ComponentKind, ComponentRecord, IdentityToken, InstanceBundle, LogicTemplates,
};
use crate::domain::invariants::{invariant_bundle_addresses, invariant_timelock_params};
use crate::errors::{DeployError, FactoryError};
use crate::ports::outbound::{ComponentDeployer, DeployRequest};
use lsd_governance::{validate_voter_set, TimelockController, VoterGovernance};
use lsd_shared_types::{keccak256_concat, Address, Hash};
use std::collections::BTreeMap;

/// Who administers the new network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminSpec {
    /// A plain account.
    Account(Address),
    /// A timelock controller deployed with the bundle.
    Timelock {
        /// Minimum delay in seconds.
        delay: i64,
        /// Controller identities.
        controllers: Vec<Address>,
    },
}

/// Everything needed to build one network.
#[derive(Clone, Debug)]
pub struct BundleRequest {
    /// Deploying factory.
    pub factory: Address,
    /// Backing token (already minted or authorized).
    pub token: IdentityToken,
    /// Requesting identity.
    pub creator: Address,
    /// Admin arrangement.
    pub admin: AdminSpec,
    /// Initial voters.
    pub voters: Vec<Address>,
    /// Initial threshold.
    pub threshold: usize,
    /// Logic templates in force.
    pub templates: LogicTemplates,
    /// Forwarded deposit target.
    pub external_deposit_target: Address,
    /// Current block.
    pub block: u64,
}

/// A fully built network, not yet recorded.
#[derive(Clone, Debug)]
pub struct StagedNetwork {
    /// Bundle to record.
    pub bundle: InstanceBundle,
    /// Bound components.
    pub components: Vec<ComponentRecord>,
    /// Bootstrapped governance.
    pub governance: VoterGovernance,
    /// Timelock admin, if requested.
    pub timelock: Option<TimelockController>,
}

/// Salt for the `kind` component of the network backed by `token`.
pub fn component_salt(token: &Address, kind: ComponentKind) -> Hash {
    keccak256_concat(&[token.as_bytes().as_slice(), kind.as_str().as_bytes()])
}

/// Component address before binding.
#[derive(Clone, Copy, Debug)]
struct Deployed {
    address: Address,
    logic: Option<Address>,
}

/// Builds networks through a `ComponentDeployer`.
pub struct BundleBuilder<'a, D: ComponentDeployer + ?Sized> {
    deployer: &'a D,
}

impl<'a, D: ComponentDeployer + ?Sized> BundleBuilder<'a, D> {
    /// Builder using `deployer`.
    pub fn new(deployer: &'a D) -> Self {
        Self { deployer }
    }

    /// Validate, deploy, bind and bootstrap one network.
    pub fn build(&self, request: BundleRequest) -> Result<StagedNetwork, FactoryError> {
        validate_voter_set(&request.voters, request.threshold)?;
        if let AdminSpec::Timelock { delay, controllers } = &request.admin {
            invariant_timelock_params(*delay, controllers)?;
        }

        let deployed = self.deploy_all(&request)?;
        let bundle = assemble(&request, &deployed)?;
        invariant_bundle_addresses(&bundle)?;
        let components = bind(&bundle, &deployed)?;

        let governance =
            VoterGovernance::with_voters(bundle.governance, request.voters, request.threshold)?;
        let timelock = match (request.admin, bundle.timelock) {
            (AdminSpec::Timelock { delay, controllers }, Some(address)) => {
                Some(TimelockController::new(address, delay, controllers)?)
            }
            _ => None,
        };

        Ok(StagedNetwork {
            bundle,
            components,
            governance,
            timelock,
        })
    }

    fn deploy_all(
        &self,
        request: &BundleRequest,
    ) -> Result<BTreeMap<ComponentKind, Deployed>, FactoryError> {
        let mut kinds = ComponentKind::BUNDLE.to_vec();
        if matches!(request.admin, AdminSpec::Timelock { .. }) {
            kinds.push(ComponentKind::Timelock);
        }

        let mut deployed = BTreeMap::new();
        for kind in kinds {
            let logic = request.templates.for_kind(kind);
            if kind.is_proxied() && logic.map_or(true, |l| l.is_zero()) {
                return Err(DeployError::MissingLogic(kind).into());
            }
            let address = self.deployer.deploy(&DeployRequest {
                deployer: request.factory,
                kind,
                logic,
                salt: component_salt(&request.token.address, kind),
            })?;
            deployed.insert(kind, Deployed { address, logic });
        }
        Ok(deployed)
    }
}

fn address_of(
    deployed: &BTreeMap<ComponentKind, Deployed>,
    kind: ComponentKind,
) -> Result<Address, FactoryError> {
    deployed
        .get(&kind)
        .map(|d| d.address)
        .ok_or_else(|| {
            FactoryError::Deployment(DeployError::Rejected {
                kind,
                reason: "component was not deployed".to_string(),
            })
        })
}

fn assemble(
    request: &BundleRequest,
    deployed: &BTreeMap<ComponentKind, Deployed>,
) -> Result<InstanceBundle, FactoryError> {
    let timelock = deployed.get(&ComponentKind::Timelock).map(|d| d.address);
    let admin = match (&request.admin, timelock) {
        (AdminSpec::Account(admin), _) => *admin,
        (AdminSpec::Timelock { .. }, Some(timelock)) => timelock,
        (AdminSpec::Timelock { .. }, None) => {
            return Err(FactoryError::InvalidAddress("timelock"));
        }
    };

    Ok(InstanceBundle {
        token: request.token.clone(),
        creator: request.creator,
        admin,
        governance: address_of(deployed, ComponentKind::NetworkProposal)?,
        fee_pool: address_of(deployed, ComponentKind::FeePool)?,
        network_balances: address_of(deployed, ComponentKind::NetworkBalances)?,
        node_deposit: address_of(deployed, ComponentKind::NodeDeposit)?,
        user_deposit: address_of(deployed, ComponentKind::UserDeposit)?,
        network_withdraw: address_of(deployed, ComponentKind::NetworkWithdraw)?,
        timelock,
        external_deposit_target: request.external_deposit_target,
        created_at_block: request.block,
    })
}

/// Bind every deployed component to the network it belongs to.
///
/// Components hold no addresses of their siblings. A record ties each one to
/// the token, and the registry resolves the rest of the bundle from there
/// (`Registry::siblings_of`). Each component must appear in the bundle under
/// the address it was deployed at.
fn bind(
    bundle: &InstanceBundle,
    deployed: &BTreeMap<ComponentKind, Deployed>,
) -> Result<Vec<ComponentRecord>, FactoryError> {
    bundle
        .components()
        .into_iter()
        .map(|(kind, address)| {
            let staged = deployed
                .get(&kind)
                .filter(|d| d.address == address)
                .ok_or_else(|| DeployError::Rejected {
                    kind,
                    reason: format!("{address} was not deployed with this bundle"),
                })?;
            Ok(ComponentRecord {
                kind,
                address,
                logic: staged.logic,
                network: bundle.token.address,
            })
        })
        .collect()
}
