//! # Network Registry
//!
//! Sole source of truth for which tokens back a network.
//!
//! | Index | Key | Rule |
//! |-------|-----|------|
//! | `bundle_index` | token | write-once |
//! | `creator_index` | creator | append-only, creation order |
//! | `component_index` | component | write-once |
//!
//! `record` checks every key before writing any of them, so a rejected
//! write leaves all three indexes untouched.

use crate::domain::entities::{ComponentRecord, IdentityToken, InstanceBundle};
use crate::errors::FactoryError;
use lsd_shared_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Registry of every network the factory created.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    creator_index: BTreeMap<Address, Vec<IdentityToken>>,
    bundle_index: BTreeMap<Address, InstanceBundle>,
    component_index: BTreeMap<Address, ComponentRecord>,
    /// Token addresses in creation order.
    creation_order: Vec<Address>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `token` already backs a network.
    pub fn contains_token(&self, token: &Address) -> bool {
        self.bundle_index.contains_key(token)
    }

    /// Fail with `TokenAlreadyUsed` if `token` backs a network.
    pub fn ensure_unused(&self, token: &Address) -> Result<(), FactoryError> {
        if self.contains_token(token) {
            return Err(FactoryError::TokenAlreadyUsed(*token));
        }
        Ok(())
    }

    /// Record a new network and its bound components.
    pub fn record(
        &mut self,
        bundle: InstanceBundle,
        components: Vec<ComponentRecord>,
    ) -> Result<(), FactoryError> {
        let token = bundle.token.address;
        self.ensure_unused(&token)?;

        let mut batch = BTreeSet::new();
        for component in &components {
            if component.network != token
                || self.component_index.contains_key(&component.address)
                || !batch.insert(component.address)
            {
                return Err(FactoryError::ComponentAlreadyBound(component.address));
            }
        }

        for component in components {
            self.component_index.insert(component.address, component);
        }
        self.creator_index
            .entry(bundle.creator)
            .or_default()
            .push(bundle.token.clone());
        self.creation_order.push(token);
        self.bundle_index.insert(token, bundle);
        Ok(())
    }

    /// Bundle backed by `token`.
    pub fn bundle_of(&self, token: &Address) -> Option<&InstanceBundle> {
        self.bundle_index.get(token)
    }

    /// Tokens created by `creator`, in creation order.
    pub fn instances_of(&self, creator: &Address) -> &[IdentityToken] {
        self.creator_index
            .get(creator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record of a bound component.
    pub fn component(&self, address: &Address) -> Option<&ComponentRecord> {
        self.component_index.get(address)
    }

    /// Resolve a component's whole bundle from its address.
    pub fn siblings_of(&self, component: &Address) -> Option<&InstanceBundle> {
        let record = self.component_index.get(component)?;
        self.bundle_index.get(&record.network)
    }

    /// Every token in creation order.
    pub fn tokens(&self) -> &[Address] {
        &self.creation_order
    }

    /// Number of networks.
    pub fn len(&self) -> usize {
        self.bundle_index.len()
    }

    /// True when no network exists.
    pub fn is_empty(&self) -> bool {
        self.bundle_index.is_empty()
    }
}
