//! # Timelock Controller
//!
//! Time-delayed admin for networks created with a timelock. Any controller
//! may schedule an admin action; it becomes executable once `min_delay`
//! seconds have passed and runs at most once. There is no cancel path.

use crate::errors::GovernanceError;
use crate::voting::ActionId;
use lsd_shared_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Delay-enforcing admin component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimelockController {
    address: Address,
    min_delay: u64,
    controllers: Vec<Address>,
    /// Pending actions and the timestamp they become executable.
    scheduled: BTreeMap<ActionId, u64>,
    executed: BTreeSet<ActionId>,
}

impl TimelockController {
    /// Create a controller at `address`.
    ///
    /// `delay` is signed so callers forwarding untrusted input get a typed
    /// rejection instead of a wrapped value.
    pub fn new(address: Address, delay: i64, controllers: Vec<Address>) -> Result<Self, GovernanceError> {
        let min_delay = validate_delay(delay)?;
        if controllers.is_empty() {
            return Err(GovernanceError::EmptyTimelockControllers);
        }
        if let Some(zero) = controllers.iter().find(|c| c.is_zero()) {
            return Err(GovernanceError::InvalidController(*zero));
        }

        Ok(Self {
            address,
            min_delay,
            controllers,
            scheduled: BTreeMap::new(),
            executed: BTreeSet::new(),
        })
    }

    /// Address of this component.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Mandatory delay in seconds.
    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    /// Identities allowed to schedule and execute.
    pub fn controllers(&self) -> &[Address] {
        &self.controllers
    }

    /// Whether `identity` is a controller.
    pub fn is_controller(&self, identity: &Address) -> bool {
        self.controllers.contains(identity)
    }

    /// Timestamp at which a scheduled action unlocks.
    pub fn ready_at(&self, action_id: &ActionId) -> Option<u64> {
        self.scheduled.get(action_id).copied()
    }

    /// Whether `action_id` may execute at `now`.
    pub fn is_ready(&self, action_id: &ActionId, now: u64) -> bool {
        self.ready_at(action_id).is_some_and(|ready_at| now >= ready_at)
    }

    /// Whether `action_id` already executed.
    pub fn is_executed(&self, action_id: &ActionId) -> bool {
        self.executed.contains(action_id)
    }

    /// Queue `action_id`. Returns the unlock timestamp.
    pub fn schedule(&mut self, caller: Address, action_id: ActionId, now: u64) -> Result<u64, GovernanceError> {
        self.ensure_controller(caller)?;
        if self.executed.contains(&action_id) {
            return Err(GovernanceError::ActionAlreadyExecuted(action_id));
        }
        if self.scheduled.contains_key(&action_id) {
            return Err(GovernanceError::ActionAlreadyScheduled(action_id));
        }

        let ready_at = now.saturating_add(self.min_delay);
        self.scheduled.insert(action_id, ready_at);
        Ok(ready_at)
    }

    /// Release `action_id` for execution. Succeeds once, after the delay.
    pub fn execute(&mut self, caller: Address, action_id: ActionId, now: u64) -> Result<(), GovernanceError> {
        self.ensure_controller(caller)?;
        if self.executed.contains(&action_id) {
            return Err(GovernanceError::ActionAlreadyExecuted(action_id));
        }
        let ready_at = self
            .ready_at(&action_id)
            .ok_or(GovernanceError::ActionNotScheduled(action_id))?;
        if now < ready_at {
            return Err(GovernanceError::ActionNotReady { ready_at, now });
        }

        self.scheduled.remove(&action_id);
        self.executed.insert(action_id);
        Ok(())
    }

    fn ensure_controller(&self, caller: Address) -> Result<(), GovernanceError> {
        if self.is_controller(&caller) {
            Ok(())
        } else {
            Err(GovernanceError::Unauthorized(caller))
        }
    }
}

/// Reject negative delays; return the delay as seconds.
pub fn validate_delay(delay: i64) -> Result<u64, GovernanceError> {
    u64::try_from(delay).map_err(|_| GovernanceError::InvalidDelay(delay))
}
