//! # Governance Errors
//!
//! Failures of voter-set validation, threshold voting and timelock control.

use lsd_shared_types::{Address, Hash};
use thiserror::Error;

/// Governance error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Bootstrap attempted on a governance that is already active.
    #[error("governance already initialized")]
    AlreadyInitialized,

    /// Vote or update attempted before bootstrap.
    #[error("governance not initialized")]
    NotInitialized,

    /// Voter list is empty.
    #[error("voter set is empty")]
    EmptyVoters,

    /// Threshold outside `1..=voters`.
    #[error("invalid threshold: {threshold} (voters: {voters})")]
    InvalidThreshold {
        /// Requested threshold
        threshold: usize,
        /// Size of the voter set
        voters: usize,
    },

    /// Same identity listed twice.
    #[error("duplicate voter: {0:?}")]
    DuplicateVoter(Address),

    /// Zero address listed as voter.
    #[error("invalid voter: {0:?}")]
    InvalidVoter(Address),

    /// Approval from an identity outside the current voter set.
    #[error("not a voter: {0:?}")]
    NotAVoter(Address),

    /// Action already reached consensus (or already ran through the timelock).
    #[error("action already executed: {0}")]
    ActionAlreadyExecuted(Hash),

    /// Caller is not a timelock controller.
    #[error("unauthorized: {0:?}")]
    Unauthorized(Address),

    /// Negative timelock delay.
    #[error("invalid delay: {0}")]
    InvalidDelay(i64),

    /// Timelock created without controllers.
    #[error("timelock controller set is empty")]
    EmptyTimelockControllers,

    /// Zero address listed as timelock controller.
    #[error("invalid timelock controller: {0:?}")]
    InvalidController(Address),

    /// Action already waiting in the timelock.
    #[error("action already scheduled: {0}")]
    ActionAlreadyScheduled(Hash),

    /// Execute called for an action that was never scheduled.
    #[error("action not scheduled: {0}")]
    ActionNotScheduled(Hash),

    /// Execute called before the delay elapsed.
    #[error("action not ready: ready at {ready_at}, now {now}")]
    ActionNotReady {
        /// Earliest execution timestamp
        ready_at: u64,
        /// Timestamp of the attempt
        now: u64,
    },
}
