//! # Network Factory Service
//!
//! Implements `NetworkFactoryApi` over the outbound ports.
//!
//! ## Ordering
//!
//! Every operation runs under one exclusive lock over `FactoryState`, so
//! operations are totally ordered. A creation stages the whole network
//! (token, components, bind, governance) against committed state and then
//! commits it in one step; any failure before the commit leaves no registry
//! entry, no creator-list entry, no nonce advance and no event.
//!
//! ## Security
//!
//! - The caller is an explicit argument taken from the request envelope
//! - Admin operations compare the caller with the configured admin only

use crate::adapters::{DeterministicDeployer, InMemoryFactoryBus, SystemChainContext};
use crate::config::FactoryServiceConfig;
use crate::domain::{
    invariant_non_zero, invariant_templates_complete, invariant_token_metadata,
    invariant_voter_limit, AdminSpec, BundleBuilder, BundleRequest, FactoryConfig, IdentityToken,
    InitializeParams, InstanceBundle, LogicTemplates, Registry, StagedNetwork,
};
use crate::errors::FactoryError;
use crate::events::{EventEnvelope, FactoryEvent, NetworkCreatedPayload};
use crate::metrics;
use crate::ports::inbound::{NetworkFactoryApi, TimelockParams};
use crate::ports::outbound::{ChainContext, ComponentDeployer, FactoryEventPublisher, TokenRequest};

use async_trait::async_trait;
use lsd_governance::{
    validate_voter_set, ActionId, TimelockController, VoteOutcome, VoterGovernance,
};
use lsd_shared_types::Address;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Statistics for the factory service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FactoryStats {
    /// Networks created.
    pub networks_created: u64,
    /// Operations rejected with an error.
    pub rejected_operations: u64,
    /// Governance votes accepted.
    pub votes_cast: u64,
}

/// Everything the factory owns. Guarded by one lock.
#[derive(Debug, Default)]
struct FactoryState {
    config: Option<FactoryConfig>,
    registry: Registry,
    /// Governance components keyed by their address.
    governances: BTreeMap<Address, VoterGovernance>,
    /// Timelock controllers keyed by their address.
    timelocks: BTreeMap<Address, TimelockController>,
    /// Deployer nonce for token mints.
    nonce: u64,
    /// Sequence of the last published event.
    sequence: u64,
}

impl FactoryState {
    fn config(&self) -> Result<&FactoryConfig, FactoryError> {
        self.config.as_ref().ok_or(FactoryError::NotInitialized)
    }

    fn admin_config(&mut self, caller: Address) -> Result<&mut FactoryConfig, FactoryError> {
        let config = self.config.as_mut().ok_or(FactoryError::NotInitialized)?;
        if !config.is_admin(&caller) {
            return Err(FactoryError::Unauthorized(caller));
        }
        Ok(config)
    }

    fn bundle(&self, token: &Address) -> Result<&InstanceBundle, FactoryError> {
        self.registry
            .bundle_of(token)
            .ok_or(FactoryError::NotFound(*token))
    }

    fn governance(&self, token: &Address) -> Result<&VoterGovernance, FactoryError> {
        let address = self.bundle(token)?.governance;
        self.governances
            .get(&address)
            .ok_or(FactoryError::NotFound(*token))
    }

    fn governance_mut(&mut self, token: &Address) -> Result<&mut VoterGovernance, FactoryError> {
        let address = self.bundle(token)?.governance;
        self.governances
            .get_mut(&address)
            .ok_or(FactoryError::NotFound(*token))
    }

    fn timelock_mut(&mut self, token: &Address) -> Result<&mut TimelockController, FactoryError> {
        let address = self
            .bundle(token)?
            .timelock
            .ok_or(FactoryError::NotFound(*token))?;
        self.timelocks
            .get_mut(&address)
            .ok_or(FactoryError::NotFound(*token))
    }

    fn authorize_token(&mut self, caller: Address, token: IdentityToken) -> Result<(), FactoryError> {
        let used = self.registry.contains_token(&token.address);
        let config = self.admin_config(caller)?;
        invariant_non_zero(&token.address, "token")?;
        if used {
            return Err(FactoryError::TokenAlreadyUsed(token.address));
        }
        config.authorized_tokens.insert(token.address, token);
        Ok(())
    }
}

fn check_initialize(caller: Address, params: &InitializeParams) -> Result<(), FactoryError> {
    if caller != params.admin {
        return Err(FactoryError::Unauthorized(caller));
    }
    invariant_non_zero(&params.admin, "admin")?;
    invariant_non_zero(&params.external_deposit_target, "external_deposit_target")?;
    invariant_templates_complete(&params.logic_templates)
}

/// Creation entry point, used for logs and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CreationKind {
    Standard,
    Timelock,
    Entrusted,
    ExistingToken,
}

impl CreationKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Timelock => "timelock",
            Self::Entrusted => "entrusted",
            Self::ExistingToken => "existing_token",
        }
    }
}

enum TokenSource {
    Mint { name: String, symbol: String },
    Existing(Address),
}

struct CreateRequest {
    kind: CreationKind,
    creator: Address,
    source: TokenSource,
    admin: AdminSpec,
    /// `None` selects the entrusted voter set.
    voters: Option<(Vec<Address>, usize)>,
}

/// The network factory.
pub struct NetworkFactoryService<D, C, P>
where
    D: ComponentDeployer,
    C: ChainContext,
    P: FactoryEventPublisher,
{
    config: FactoryServiceConfig,
    deployer: Arc<D>,
    chain: Arc<C>,
    publisher: Arc<P>,
    state: Mutex<FactoryState>,
    stats: parking_lot::Mutex<FactoryStats>,
}

impl NetworkFactoryService<DeterministicDeployer, SystemChainContext, InMemoryFactoryBus> {
    /// Factory with the deterministic deployer, wall clock and in-memory bus.
    pub fn in_memory(config: FactoryServiceConfig) -> Self {
        let bus = InMemoryFactoryBus::with_capacity(config.event_capacity);
        Self::new(
            config,
            Arc::new(DeterministicDeployer::new()),
            Arc::new(SystemChainContext::new()),
            Arc::new(bus),
        )
    }
}

impl<D, C, P> NetworkFactoryService<D, C, P>
where
    D: ComponentDeployer,
    C: ChainContext,
    P: FactoryEventPublisher,
{
    /// Create an uninitialized factory.
    pub fn new(config: FactoryServiceConfig, deployer: Arc<D>, chain: Arc<C>, publisher: Arc<P>) -> Self {
        info!(
            factory = %config.factory_address,
            max_voters = config.max_voters,
            "Network factory created"
        );
        Self {
            config,
            deployer,
            chain,
            publisher,
            state: Mutex::new(FactoryState::default()),
            stats: parking_lot::Mutex::new(FactoryStats::default()),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &FactoryServiceConfig {
        &self.config
    }

    /// Event publisher.
    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    /// Current statistics.
    pub fn stats(&self) -> FactoryStats {
        self.stats.lock().clone()
    }

    fn rejected(&self, operation: &'static str, err: &FactoryError) {
        warn!(operation, code = err.code(), error = %err, "Operation rejected");
        metrics::record_rejection(err.code());
        self.stats.lock().rejected_operations += 1;
    }

    async fn emit(&self, state: &mut FactoryState, event: FactoryEvent) {
        state.sequence += 1;
        let receivers = self
            .publisher
            .publish(EventEnvelope::new(state.sequence, event))
            .await;
        debug!(sequence = state.sequence, receivers, "Factory event emitted");
    }

    /// Resolve the token, voters and components of a new network without
    /// touching committed state.
    fn stage(&self, state: &FactoryState, request: CreateRequest) -> Result<(StagedNetwork, bool), FactoryError> {
        let config = state.config()?;

        let (voters, threshold) = match request.voters {
            Some(explicit) => explicit,
            None => {
                if config.entrusted_voters.is_empty() {
                    return Err(FactoryError::EmptyEntrustedVoters);
                }
                (config.entrusted_voters.clone(), config.entrusted_threshold)
            }
        };
        invariant_voter_limit(&voters, self.config.max_voters)?;
        validate_voter_set(&voters, threshold)?;
        if let AdminSpec::Account(admin) = &request.admin {
            invariant_non_zero(admin, "admin")?;
        }

        let (token, minted) = match request.source {
            TokenSource::Mint { name, symbol } => {
                invariant_token_metadata(
                    &name,
                    &symbol,
                    self.config.max_name_len,
                    self.config.max_symbol_len,
                )?;
                let address = self.deployer.mint_token(&TokenRequest {
                    deployer: self.config.factory_address,
                    nonce: state.nonce,
                    name: name.clone(),
                    symbol: symbol.clone(),
                })?;
                state.registry.ensure_unused(&address)?;
                (IdentityToken::new(address, name, symbol), true)
            }
            TokenSource::Existing(address) => {
                // Registry membership decides "used", never the token itself
                state.registry.ensure_unused(&address)?;
                let token = config
                    .authorized_tokens
                    .get(&address)
                    .cloned()
                    .ok_or(FactoryError::TokenNotAuthorized(address))?;
                (token, false)
            }
        };

        let staged = BundleBuilder::new(self.deployer.as_ref()).build(BundleRequest {
            factory: self.config.factory_address,
            token,
            creator: request.creator,
            admin: request.admin,
            voters,
            threshold,
            templates: config.logic_templates,
            external_deposit_target: config.external_deposit_target,
            block: self.chain.block_number(),
        })?;
        Ok((staged, minted))
    }

    /// Write a staged network into committed state.
    async fn commit(
        &self,
        state: &mut FactoryState,
        staged: StagedNetwork,
        minted: bool,
    ) -> Result<InstanceBundle, FactoryError> {
        let StagedNetwork {
            bundle,
            components,
            governance,
            timelock,
        } = staged;
        let payload = NetworkCreatedPayload::from_bundle(
            &bundle,
            governance.voters().to_vec(),
            governance.threshold(),
            minted,
        );

        state.registry.record(bundle.clone(), components)?;
        state.governances.insert(governance.address(), governance);
        if let Some(timelock) = timelock {
            state.timelocks.insert(timelock.address(), timelock);
        }
        if minted {
            state.nonce += 1;
        } else if let Some(config) = state.config.as_mut() {
            config.authorized_tokens.remove(&bundle.token.address);
        }

        self.emit(state, FactoryEvent::NetworkCreated(payload)).await;
        Ok(bundle)
    }

    async fn create(&self, request: CreateRequest) -> Result<InstanceBundle, FactoryError> {
        let kind = request.kind;
        let mut state = self.state.lock().await;

        let result = match self.stage(&state, request) {
            Ok((staged, minted)) => self.commit(&mut state, staged, minted).await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(bundle) => {
                info!(
                    kind = kind.as_str(),
                    token = %bundle.token.address,
                    creator = %bundle.creator,
                    governance = %bundle.governance,
                    "Network created"
                );
                metrics::record_network_created(kind.as_str());
                self.stats.lock().networks_created += 1;
            }
            Err(err) => self.rejected(kind.as_str(), err),
        }
        result
    }
}

#[async_trait]
impl<D, C, P> NetworkFactoryApi for NetworkFactoryService<D, C, P>
where
    D: ComponentDeployer + 'static,
    C: ChainContext + 'static,
    P: FactoryEventPublisher + 'static,
{
    #[instrument(skip(self, params), fields(caller = %caller))]
    async fn initialize(&self, caller: Address, params: InitializeParams) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let result = if state.config.is_some() {
            Err(FactoryError::AlreadyInitialized)
        } else {
            check_initialize(caller, &params)
        };
        if let Err(err) = &result {
            self.rejected("initialize", err);
            return result;
        }

        let admin = params.admin;
        state.config = Some(FactoryConfig::from_params(params));
        info!(admin = %admin, "Factory initialized");
        self.emit(&mut state, FactoryEvent::FactoryInitialized { admin })
            .await;
        Ok(())
    }

    #[instrument(skip(self, token), fields(caller = %caller, token = %token.address))]
    async fn add_authorized_token(&self, caller: Address, token: IdentityToken) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let address = token.address;
        let result = state.authorize_token(caller, token);
        if let Err(err) = &result {
            self.rejected("add_authorized_token", err);
            return result;
        }

        info!("Token authorized");
        self.emit(&mut state, FactoryEvent::AuthorizedTokenAdded { token: address })
            .await;
        Ok(())
    }

    #[instrument(skip(self), fields(caller = %caller, token = %token))]
    async fn remove_authorized_token(&self, caller: Address, token: Address) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let result = state.admin_config(caller).and_then(|config| {
            config
                .authorized_tokens
                .remove(&token)
                .map(|_| ())
                .ok_or(FactoryError::TokenNotAuthorized(token))
        });
        if let Err(err) = &result {
            self.rejected("remove_authorized_token", err);
            return result;
        }

        info!("Token authorization revoked");
        self.emit(&mut state, FactoryEvent::AuthorizedTokenRemoved { token })
            .await;
        Ok(())
    }

    #[instrument(skip(self, voters), fields(caller = %caller, voters = voters.len()))]
    async fn set_entrusted_voters(
        &self,
        caller: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let max_voters = self.config.max_voters;
        let result = state.admin_config(caller).and_then(|config| {
            invariant_voter_limit(&voters, max_voters)?;
            validate_voter_set(&voters, threshold)?;
            config.entrusted_voters = voters.clone();
            config.entrusted_threshold = threshold;
            Ok(())
        });
        if let Err(err) = &result {
            self.rejected("set_entrusted_voters", err);
            return result;
        }

        info!("Entrusted voters set");
        self.emit(&mut state, FactoryEvent::EntrustedVotersSet { voters, threshold })
            .await;
        Ok(())
    }

    #[instrument(skip(self), fields(caller = %caller, new_admin = %new_admin))]
    async fn transfer_admin(&self, caller: Address, new_admin: Address) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let result = state.admin_config(caller).and_then(|config| {
            invariant_non_zero(&new_admin, "admin")?;
            config.admin = new_admin;
            Ok(())
        });
        if let Err(err) = &result {
            self.rejected("transfer_admin", err);
            return result;
        }

        info!("Factory admin transferred");
        self.emit(
            &mut state,
            FactoryEvent::AdminTransferred {
                previous: caller,
                new_admin,
            },
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self, templates), fields(caller = %caller))]
    async fn set_logic_templates(
        &self,
        caller: Address,
        templates: LogicTemplates,
    ) -> Result<(), FactoryError> {
        let mut state = self.state.lock().await;
        let result = state.admin_config(caller).and_then(|config| {
            invariant_templates_complete(&templates)?;
            config.logic_templates = templates;
            Ok(())
        });
        if let Err(err) = &result {
            self.rejected("set_logic_templates", err);
            return result;
        }

        info!("Logic templates updated");
        self.emit(&mut state, FactoryEvent::LogicTemplatesUpdated(templates))
            .await;
        Ok(())
    }

    #[instrument(skip(self, name, symbol, voters), fields(caller = %caller))]
    async fn create_instance(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        admin: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<IdentityToken, FactoryError> {
        self.create(CreateRequest {
            kind: CreationKind::Standard,
            creator: caller,
            source: TokenSource::Mint { name, symbol },
            admin: AdminSpec::Account(admin),
            voters: Some((voters, threshold)),
        })
        .await
        .map(|bundle| bundle.token)
    }

    #[instrument(skip(self, name, symbol, voters, timelock), fields(caller = %caller, delay = timelock.delay))]
    async fn create_instance_with_timelock(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        voters: Vec<Address>,
        threshold: usize,
        timelock: TimelockParams,
    ) -> Result<IdentityToken, FactoryError> {
        self.create(CreateRequest {
            kind: CreationKind::Timelock,
            creator: caller,
            source: TokenSource::Mint { name, symbol },
            admin: AdminSpec::Timelock {
                delay: timelock.delay,
                controllers: timelock.controllers,
            },
            voters: Some((voters, threshold)),
        })
        .await
        .map(|bundle| bundle.token)
    }

    #[instrument(skip(self, name, symbol), fields(caller = %caller))]
    async fn create_instance_with_entrusted_voters(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        admin: Address,
    ) -> Result<IdentityToken, FactoryError> {
        self.create(CreateRequest {
            kind: CreationKind::Entrusted,
            creator: caller,
            source: TokenSource::Mint { name, symbol },
            admin: AdminSpec::Account(admin),
            voters: None,
        })
        .await
        .map(|bundle| bundle.token)
    }

    #[instrument(skip(self, voters), fields(caller = %caller, token = %token))]
    async fn create_instance_with_token(
        &self,
        caller: Address,
        token: Address,
        admin: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<InstanceBundle, FactoryError> {
        self.create(CreateRequest {
            kind: CreationKind::ExistingToken,
            creator: caller,
            source: TokenSource::Existing(token),
            admin: AdminSpec::Account(admin),
            voters: Some((voters, threshold)),
        })
        .await
    }

    async fn bundle_of(&self, token: Address) -> Result<InstanceBundle, FactoryError> {
        let state = self.state.lock().await;
        state.bundle(&token).cloned()
    }

    async fn instances_of(&self, creator: Address) -> Vec<IdentityToken> {
        let state = self.state.lock().await;
        state.registry.instances_of(&creator).to_vec()
    }

    async fn entrusted_voters(&self) -> Result<(Vec<Address>, usize), FactoryError> {
        let state = self.state.lock().await;
        let config = state.config()?;
        Ok((config.entrusted_voters.clone(), config.entrusted_threshold))
    }

    async fn authorized_tokens(&self) -> Result<Vec<IdentityToken>, FactoryError> {
        let state = self.state.lock().await;
        Ok(state.config()?.authorized_tokens.values().cloned().collect())
    }

    async fn total_instances(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    async fn is_initialized(&self) -> bool {
        self.state.lock().await.config.is_some()
    }

    async fn admin(&self) -> Result<Address, FactoryError> {
        let state = self.state.lock().await;
        Ok(state.config()?.admin)
    }

    async fn governance_of(&self, token: Address) -> Result<VoterGovernance, FactoryError> {
        let state = self.state.lock().await;
        state.governance(&token).cloned()
    }

    #[instrument(skip(self), fields(token = %token, voter = %voter, action = %action_id))]
    async fn vote(
        &self,
        token: Address,
        voter: Address,
        action_id: ActionId,
    ) -> Result<VoteOutcome, FactoryError> {
        let mut state = self.state.lock().await;
        let result = state.governance_mut(&token).and_then(|governance| {
            governance
                .propose_and_vote(action_id, voter)
                .map_err(FactoryError::from)
        });

        match &result {
            Ok(outcome) => {
                metrics::record_vote();
                self.stats.lock().votes_cast += 1;
                if *outcome == VoteOutcome::Approved {
                    info!("Action approved");
                } else {
                    debug!("Vote recorded");
                }
            }
            Err(err) => self.rejected("vote", err),
        }
        result
    }

    #[instrument(skip(self, new_voters), fields(token = %token, voter = %voter))]
    async fn propose_voter_update(
        &self,
        token: Address,
        voter: Address,
        new_voters: Vec<Address>,
        new_threshold: usize,
    ) -> Result<VoteOutcome, FactoryError> {
        let mut state = self.state.lock().await;
        let max_voters = self.config.max_voters;
        let result = invariant_voter_limit(&new_voters, max_voters).and_then(|_| {
            let governance = state.governance_mut(&token)?;
            let outcome = governance.update_voters(voter, new_voters.clone(), new_threshold)?;
            Ok((outcome, governance.epoch()))
        });

        let (outcome, epoch) = match result {
            Ok(applied) => applied,
            Err(err) => {
                self.rejected("propose_voter_update", &err);
                return Err(err);
            }
        };

        metrics::record_vote();
        self.stats.lock().votes_cast += 1;
        if outcome == VoteOutcome::Approved {
            info!(epoch, "Voter set replaced");
            self.emit(
                &mut state,
                FactoryEvent::VotersUpdated {
                    token,
                    voters: new_voters,
                    threshold: new_threshold,
                    epoch,
                },
            )
            .await;
        }
        Ok(outcome)
    }

    async fn timelock_of(&self, token: Address) -> Result<TimelockController, FactoryError> {
        let state = self.state.lock().await;
        let address = state
            .bundle(&token)?
            .timelock
            .ok_or(FactoryError::NotFound(token))?;
        state
            .timelocks
            .get(&address)
            .cloned()
            .ok_or(FactoryError::NotFound(token))
    }

    #[instrument(skip(self), fields(token = %token, caller = %caller, action = %action_id))]
    async fn schedule_admin_action(
        &self,
        token: Address,
        caller: Address,
        action_id: ActionId,
    ) -> Result<u64, FactoryError> {
        let now = self.chain.timestamp();
        let mut state = self.state.lock().await;
        let result = state
            .timelock_mut(&token)
            .and_then(|timelock| {
                timelock
                    .schedule(caller, action_id, now)
                    .map_err(FactoryError::from)
            });

        match &result {
            Ok(ready_at) => info!(ready_at, "Admin action scheduled"),
            Err(err) => self.rejected("schedule_admin_action", err),
        }
        result
    }

    #[instrument(skip(self), fields(token = %token, caller = %caller, action = %action_id))]
    async fn execute_admin_action(
        &self,
        token: Address,
        caller: Address,
        action_id: ActionId,
    ) -> Result<(), FactoryError> {
        let now = self.chain.timestamp();
        let mut state = self.state.lock().await;
        let result = state
            .timelock_mut(&token)
            .and_then(|timelock| {
                timelock
                    .execute(caller, action_id, now)
                    .map_err(FactoryError::from)
            });

        match &result {
            Ok(()) => info!("Admin action executed"),
            Err(err) => self.rejected("execute_admin_action", err),
        }
        result
    }
}
