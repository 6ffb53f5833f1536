//! # LSD Governance
//!
//! Per-network governance primitives.
//!
//! ## Purpose
//!
//! Every LSD network carries one `VoterGovernance` (the network proposal
//! component) that decides whether consensus exists for a privileged action.
//! Execution of the action is left to the calling component. Networks created
//! with a timelock additionally get a `TimelockController` as their admin.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `1 <= threshold <= |voters|` | `invariants.rs` - `invariant_threshold_bounds()` |
//! | Distinct, non-zero voters | `invariants.rs` - `invariant_distinct_members()` |
//! | One approval per voter per action | `voting.rs` - `propose_and_vote()` |
//! | Voter changes are self-governed | `voting.rs` - `update_voters()` |
//! | Admin actions wait `min_delay` | `timelock.rs` - `execute()` |
//!
//! ## Module Structure
//!
//! ```text
//! lsd-governance/
//! ├── errors.rs      # GovernanceError
//! ├── invariants.rs  # voter set validation
//! ├── voting.rs      # VoterGovernance state machine
//! └── timelock.rs    # TimelockController
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod invariants;
pub mod timelock;
pub mod voting;

pub use errors::GovernanceError;
pub use invariants::validate_voter_set;
pub use timelock::{validate_delay, TimelockController};
pub use voting::{ActionId, ActionStatus, GovernanceState, VoteOutcome, VoterGovernance};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
