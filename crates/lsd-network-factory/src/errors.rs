//! # Error Types
//!
//! All error types for network provisioning.

use crate::domain::entities::ComponentKind;
use lsd_governance::GovernanceError;
use lsd_shared_types::Address;
use thiserror::Error;

// =============================================================================
// FACTORY ERRORS
// =============================================================================

/// Errors surfaced by factory operations.
///
/// Every variant is returned synchronously to the caller of the failing
/// operation; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// `initialize` called a second time.
    #[error("factory already initialized")]
    AlreadyInitialized,

    /// Operation attempted before `initialize`.
    #[error("factory not initialized")]
    NotInitialized,

    /// Caller lacks the admin (or controller) capability.
    #[error("unauthorized caller: {0:?}")]
    Unauthorized(Address),

    /// No voters supplied.
    #[error("voter set is empty")]
    EmptyVoters,

    /// Entrusted voter set not configured.
    #[error("entrusted voter set is empty")]
    EmptyEntrustedVoters,

    /// Threshold outside `1..=voters`.
    #[error("invalid threshold: {threshold} (voters: {voters})")]
    InvalidThreshold {
        /// Requested threshold
        threshold: usize,
        /// Size of the voter set
        voters: usize,
    },

    /// Negative timelock delay.
    #[error("invalid delay: {0}")]
    InvalidDelay(i64),

    /// Pre-existing token was never authorized.
    #[error("token not authorized: {0:?}")]
    TokenNotAuthorized(Address),

    /// Token already backs a network. Permanent.
    #[error("token already used: {0:?}")]
    TokenAlreadyUsed(Address),

    /// Vote from an identity outside the current voter set.
    #[error("not a voter: {0:?}")]
    NotAVoter(Address),

    /// No network recorded for this token.
    #[error("network not found for token: {0:?}")]
    NotFound(Address),

    /// Zero address where a real one is required.
    #[error("invalid address for {0}")]
    InvalidAddress(&'static str),

    /// Token name or symbol rejected.
    #[error("invalid token metadata: {0}")]
    InvalidTokenMetadata(String),

    /// Voter list longer than the configured maximum.
    #[error("too many voters: {count} > {max}")]
    TooManyVoters {
        /// Supplied voters
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// A component address already belongs to another network.
    #[error("component already bound: {0:?}")]
    ComponentAlreadyBound(Address),

    /// Component deployment failed.
    #[error("deployment failed: {0}")]
    Deployment(#[from] DeployError),

    /// Governance failure without a factory-level counterpart.
    #[error("governance error: {0}")]
    Governance(GovernanceError),
}

impl FactoryError {
    /// True for failures that will never succeed on retry.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInitialized | Self::TokenAlreadyUsed(_) | Self::ComponentAlreadyBound(_)
        )
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "already_initialized",
            Self::NotInitialized => "not_initialized",
            Self::Unauthorized(_) => "unauthorized",
            Self::EmptyVoters => "empty_voters",
            Self::EmptyEntrustedVoters => "empty_entrusted_voters",
            Self::InvalidThreshold { .. } => "invalid_threshold",
            Self::InvalidDelay(_) => "invalid_delay",
            Self::TokenNotAuthorized(_) => "token_not_authorized",
            Self::TokenAlreadyUsed(_) => "token_already_used",
            Self::NotAVoter(_) => "not_a_voter",
            Self::NotFound(_) => "not_found",
            Self::InvalidAddress(_) => "invalid_address",
            Self::InvalidTokenMetadata(_) => "invalid_token_metadata",
            Self::TooManyVoters { .. } => "too_many_voters",
            Self::ComponentAlreadyBound(_) => "component_already_bound",
            Self::Deployment(_) => "deployment",
            Self::Governance(_) => "governance",
        }
    }
}

impl From<GovernanceError> for FactoryError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::EmptyVoters => Self::EmptyVoters,
            GovernanceError::InvalidThreshold { threshold, voters } => {
                Self::InvalidThreshold { threshold, voters }
            }
            GovernanceError::NotAVoter(voter) => Self::NotAVoter(voter),
            GovernanceError::InvalidDelay(delay) => Self::InvalidDelay(delay),
            GovernanceError::Unauthorized(caller) => Self::Unauthorized(caller),
            other => Self::Governance(other),
        }
    }
}

// =============================================================================
// DEPLOY ERRORS
// =============================================================================

/// Errors from the component deployer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Proxied component requested without a logic template.
    #[error("missing logic template for {0}")]
    MissingLogic(ComponentKind),

    /// Deployer refused the request.
    #[error("deployment of {kind} rejected: {reason}")]
    Rejected {
        /// Component being deployed
        kind: ComponentKind,
        /// Deployer-supplied reason
        reason: String,
    },

    /// Token mint refused.
    #[error("token mint rejected: {0}")]
    TokenMintRejected(String),
}

// =============================================================================
// TESTS
// =============================================================================
