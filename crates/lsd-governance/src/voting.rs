//! # Voter Governance
//!
//! Threshold voting over a mutable voter set.
//!
//! ## State Machine
//!
//! ```text
//! [Uninitialized] ──bootstrap──→ [Active] ──update_voters (self-governed)──→ [Active]
//! ```
//!
//! Approvals are stored as a set of `(action_id, voter)` pairs, so a
//! resubmitted vote is a no-op rather than a second increment. An action
//! reaches `Approved` exactly once; further votes on it are rejected.
//!
//! Replacing the voter set starts a new epoch: approvals still pending under
//! the old set are dropped and never re-evaluated against the new one.
//!
//! Voter-update ballots are tallied apart from ordinary actions. An update id
//! submitted through `propose_and_vote` is just an unrelated action and can
//! neither apply nor consume the update.

use crate::errors::GovernanceError;
use crate::invariants::validate_voter_set;
use lsd_shared_types::{keccak256_concat, Address, Hash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a governed action.
pub type ActionId = Hash;

/// Domain tag mixed into voter-update action ids.
const UPDATE_VOTERS_TAG: &[u8] = b"lsd.governance.update_voters";

/// Lifecycle of a governance component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceState {
    /// Deployed but not yet bootstrapped.
    Uninitialized,
    /// Bootstrapped with a voter set.
    Active {
        /// Ordered voter identities.
        voters: Vec<Address>,
        /// Distinct approvals required.
        threshold: usize,
    },
}

/// Result of casting a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    /// Approvals recorded, threshold not reached.
    Pending,
    /// Threshold reached by this vote; the action may execute once.
    Approved,
}

/// Status of an action as seen by the current epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    /// No approvals recorded.
    Inactive,
    /// Some approvals recorded.
    Pending {
        /// Distinct approvals so far
        approvals: usize,
    },
    /// Consensus reached.
    Approved,
}

/// Per-network threshold voting component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterGovernance {
    address: Address,
    state: GovernanceState,
    /// `(action, voter)` pairs for the current epoch.
    approvals: BTreeSet<(ActionId, Address)>,
    /// Actions that reached consensus, across all epochs.
    approved: BTreeSet<ActionId>,
    /// `(update id, voter)` pairs for voter-set replacements in this epoch.
    #[serde(default)]
    update_approvals: BTreeSet<(ActionId, Address)>,
    epoch: u64,
}

impl VoterGovernance {
    /// Create an uninitialized governance deployed at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: GovernanceState::Uninitialized,
            approvals: BTreeSet::new(),
            approved: BTreeSet::new(),
            update_approvals: BTreeSet::new(),
            epoch: 0,
        }
    }

    /// Create and bootstrap in one step.
    pub fn with_voters(
        address: Address,
        voters: Vec<Address>,
        threshold: usize,
    ) -> Result<Self, GovernanceError> {
        let mut governance = Self::new(address);
        governance.bootstrap(voters, threshold)?;
        Ok(governance)
    }

    /// One-time bootstrap performed by the deployer before hand-off.
    pub fn bootstrap(&mut self, voters: Vec<Address>, threshold: usize) -> Result<(), GovernanceError> {
        if self.is_active() {
            return Err(GovernanceError::AlreadyInitialized);
        }
        validate_voter_set(&voters, threshold)?;
        self.state = GovernanceState::Active { voters, threshold };
        Ok(())
    }

    /// Address of this component.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    /// True once bootstrapped.
    pub fn is_active(&self) -> bool {
        matches!(self.state, GovernanceState::Active { .. })
    }

    /// Voter-set generation; bumped each time an update takes effect.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current voters in insertion order. Empty before bootstrap.
    pub fn voters(&self) -> &[Address] {
        match &self.state {
            GovernanceState::Active { voters, .. } => voters,
            GovernanceState::Uninitialized => &[],
        }
    }

    /// Current threshold. Zero before bootstrap.
    pub fn threshold(&self) -> usize {
        match &self.state {
            GovernanceState::Active { threshold, .. } => *threshold,
            GovernanceState::Uninitialized => 0,
        }
    }

    /// Membership check against the current set.
    pub fn is_voter(&self, identity: &Address) -> bool {
        self.voters().contains(identity)
    }

    /// Distinct approvals recorded for `action_id` in this epoch.
    pub fn approvals(&self, action_id: &ActionId) -> usize {
        count_for(&self.approvals, action_id)
    }

    /// Distinct approvals for replacing the set with `new_voters`/`new_threshold`.
    pub fn update_approvals(&self, new_voters: &[Address], new_threshold: usize) -> usize {
        let update_id = self.update_voters_action_id(new_voters, new_threshold);
        count_for(&self.update_approvals, &update_id)
    }

    /// Whether `voter` already approved `action_id` in this epoch.
    pub fn has_voted(&self, action_id: &ActionId, voter: &Address) -> bool {
        self.approvals.contains(&(*action_id, *voter))
    }

    /// Status of `action_id`.
    pub fn status(&self, action_id: &ActionId) -> ActionStatus {
        if self.approved.contains(action_id) {
            return ActionStatus::Approved;
        }
        match self.approvals(action_id) {
            0 => ActionStatus::Inactive,
            approvals => ActionStatus::Pending { approvals },
        }
    }

    /// Record `voter`'s approval of `action_id`.
    ///
    /// Returns `Approved` on the vote that reaches the threshold. A repeated
    /// vote from the same voter leaves the count unchanged.
    pub fn propose_and_vote(
        &mut self,
        action_id: ActionId,
        voter: Address,
    ) -> Result<VoteOutcome, GovernanceError> {
        let threshold = self.member_threshold(&voter)?;

        if self.approved.contains(&action_id) {
            return Err(GovernanceError::ActionAlreadyExecuted(action_id));
        }

        // Set semantics: a resubmitted vote changes nothing
        self.approvals.insert((action_id, voter));

        if self.approvals(&action_id) >= threshold {
            self.approved.insert(action_id);
            self.approvals.retain(|(action, _)| *action != action_id);
            Ok(VoteOutcome::Approved)
        } else {
            Ok(VoteOutcome::Pending)
        }
    }

    /// Action id for replacing the voter set with `new_voters`/`new_threshold`.
    ///
    /// The epoch is part of the digest so the same target set can be proposed
    /// again after an intervening change.
    pub fn update_voters_action_id(&self, new_voters: &[Address], new_threshold: usize) -> ActionId {
        let mut parts: Vec<&[u8]> = Vec::with_capacity(new_voters.len() + 3);
        let epoch = self.epoch.to_be_bytes();
        let threshold = (new_threshold as u64).to_be_bytes();
        parts.push(UPDATE_VOTERS_TAG);
        parts.push(&epoch);
        for voter in new_voters {
            parts.push(voter.as_bytes().as_slice());
        }
        parts.push(&threshold);
        keccak256_concat(&parts)
    }

    /// Vote to replace the voter set. The change takes effect on the vote
    /// that reaches the current threshold.
    pub fn update_voters(
        &mut self,
        voter: Address,
        new_voters: Vec<Address>,
        new_threshold: usize,
    ) -> Result<VoteOutcome, GovernanceError> {
        validate_voter_set(&new_voters, new_threshold)?;
        let action_id = self.update_voters_action_id(&new_voters, new_threshold);

        let threshold = self.member_threshold(&voter)?;
        self.update_approvals.insert((action_id, voter));
        if count_for(&self.update_approvals, &action_id) < threshold {
            return Ok(VoteOutcome::Pending);
        }

        self.state = GovernanceState::Active {
            voters: new_voters,
            threshold: new_threshold,
        };
        self.epoch += 1;
        self.approvals.clear();
        self.update_approvals.clear();
        Ok(VoteOutcome::Approved)
    }

    fn member_threshold(&self, voter: &Address) -> Result<usize, GovernanceError> {
        match &self.state {
            GovernanceState::Uninitialized => Err(GovernanceError::NotInitialized),
            GovernanceState::Active { voters, threshold } => {
                if voters.contains(voter) {
                    Ok(*threshold)
                } else {
                    Err(GovernanceError::NotAVoter(*voter))
                }
            }
        }
    }
}

fn count_for(approvals: &BTreeSet<(ActionId, Address)>, action_id: &ActionId) -> usize {
    let lowest = (*action_id, Address::ZERO);
    let highest = (*action_id, Address::repeat_byte(0xff));
    approvals.range(lowest..=highest).count()
}
