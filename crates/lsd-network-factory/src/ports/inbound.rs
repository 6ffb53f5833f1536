//! # Inbound Ports
//!
//! API trait defining what the network factory can do.
//!
//! Every mutating operation takes the caller identity as its first argument.
//! The caller comes from the envelope of the request and is never read from
//! a payload field.

use crate::domain::entities::{IdentityToken, InitializeParams, InstanceBundle, LogicTemplates};
use crate::errors::FactoryError;
use async_trait::async_trait;
use lsd_governance::{ActionId, TimelockController, VoteOutcome, VoterGovernance};
use lsd_shared_types::Address;

/// Timelock settings for `create_instance_with_timelock`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelockParams {
    /// Minimum delay in seconds. Negative values are rejected.
    pub delay: i64,
    /// Identities allowed to schedule and execute admin actions.
    pub controllers: Vec<Address>,
}

/// Network factory API - inbound port.
#[async_trait]
pub trait NetworkFactoryApi: Send + Sync {
    // ---- Configuration ----------------------------------------------------

    /// One-time setup. Only `params.admin` may call it.
    async fn initialize(&self, caller: Address, params: InitializeParams) -> Result<(), FactoryError>;

    /// Allow `token` to back one network.
    async fn add_authorized_token(
        &self,
        caller: Address,
        token: IdentityToken,
    ) -> Result<(), FactoryError>;

    /// Revoke a token authorization. Existing networks are unaffected.
    async fn remove_authorized_token(&self, caller: Address, token: Address) -> Result<(), FactoryError>;

    /// Replace the entrusted voter set.
    async fn set_entrusted_voters(
        &self,
        caller: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<(), FactoryError>;

    /// Hand the admin capability to `new_admin`.
    async fn transfer_admin(&self, caller: Address, new_admin: Address) -> Result<(), FactoryError>;

    /// Replace the logic templates used for future networks.
    async fn set_logic_templates(
        &self,
        caller: Address,
        templates: LogicTemplates,
    ) -> Result<(), FactoryError>;

    // ---- Creation ---------------------------------------------------------

    /// Mint a token and build a network governed by `voters`.
    async fn create_instance(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        admin: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<IdentityToken, FactoryError>;

    /// Like `create_instance`, with a timelock controller as admin.
    async fn create_instance_with_timelock(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        voters: Vec<Address>,
        threshold: usize,
        timelock: TimelockParams,
    ) -> Result<IdentityToken, FactoryError>;

    /// Like `create_instance`, governed by the entrusted voter set.
    async fn create_instance_with_entrusted_voters(
        &self,
        caller: Address,
        name: String,
        symbol: String,
        admin: Address,
    ) -> Result<IdentityToken, FactoryError>;

    /// Build a network around an authorized pre-existing token.
    async fn create_instance_with_token(
        &self,
        caller: Address,
        token: Address,
        admin: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<InstanceBundle, FactoryError>;

    // ---- Queries ----------------------------------------------------------

    /// Bundle backed by `token`.
    async fn bundle_of(&self, token: Address) -> Result<InstanceBundle, FactoryError>;

    /// Tokens created by `creator`, oldest first.
    async fn instances_of(&self, creator: Address) -> Vec<IdentityToken>;

    /// Entrusted voters and threshold.
    async fn entrusted_voters(&self) -> Result<(Vec<Address>, usize), FactoryError>;

    /// Currently authorized, unused tokens.
    async fn authorized_tokens(&self) -> Result<Vec<IdentityToken>, FactoryError>;

    /// Number of networks created.
    async fn total_instances(&self) -> usize;

    /// Whether `initialize` has run.
    async fn is_initialized(&self) -> bool;

    /// Current factory admin.
    async fn admin(&self) -> Result<Address, FactoryError>;

    // ---- Per-network governance -------------------------------------------

    /// Snapshot of a network's governance.
    async fn governance_of(&self, token: Address) -> Result<VoterGovernance, FactoryError>;

    /// Approve `action_id` on a network's governance.
    async fn vote(
        &self,
        token: Address,
        voter: Address,
        action_id: ActionId,
    ) -> Result<VoteOutcome, FactoryError>;

    /// Vote to replace a network's voter set.
    async fn propose_voter_update(
        &self,
        token: Address,
        voter: Address,
        new_voters: Vec<Address>,
        new_threshold: usize,
    ) -> Result<VoteOutcome, FactoryError>;

    /// Snapshot of a network's timelock controller.
    async fn timelock_of(&self, token: Address) -> Result<TimelockController, FactoryError>;

    /// Queue an admin action on a timelock network. Returns its unlock time.
    async fn schedule_admin_action(
        &self,
        token: Address,
        caller: Address,
        action_id: ActionId,
    ) -> Result<u64, FactoryError>;

    /// Release a queued admin action once its delay has passed.
    async fn execute_admin_action(
        &self,
        token: Address,
        caller: Address,
        action_id: ActionId,
    ) -> Result<(), FactoryError>;
}
