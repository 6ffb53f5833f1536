//! # Governance Invariants
//!
//! Rules every voter set must satisfy, both at bootstrap and on update.
//!
//! | Invariant | Rule |
//! |-----------|------|
//! | Non-empty | `voters.len() >= 1` |
//! | Threshold bounds | `1 <= threshold <= voters.len()` |
//! | Distinct members | no identity listed twice |
//! | Real members | the zero address is never a voter |

use crate::errors::GovernanceError;
use lsd_shared_types::Address;
use std::collections::BTreeSet;

/// Invariant: the voter set is non-empty.
pub fn invariant_non_empty(voters: &[Address]) -> Result<(), GovernanceError> {
    if voters.is_empty() {
        return Err(GovernanceError::EmptyVoters);
    }
    Ok(())
}

/// Invariant: `1 <= threshold <= |voters|`.
pub fn invariant_threshold_bounds(threshold: usize, voter_count: usize) -> Result<(), GovernanceError> {
    if threshold < 1 || threshold > voter_count {
        return Err(GovernanceError::InvalidThreshold {
            threshold,
            voters: voter_count,
        });
    }
    Ok(())
}

/// Invariant: members are distinct, non-zero identities.
pub fn invariant_distinct_members(voters: &[Address]) -> Result<(), GovernanceError> {
    let mut seen = BTreeSet::new();
    for voter in voters {
        if voter.is_zero() {
            return Err(GovernanceError::InvalidVoter(*voter));
        }
        if !seen.insert(*voter) {
            return Err(GovernanceError::DuplicateVoter(*voter));
        }
    }
    Ok(())
}

/// Validate a candidate voter set against every invariant.
///
/// Emptiness is reported ahead of the threshold so an empty list never
/// surfaces as `InvalidThreshold`.
pub fn validate_voter_set(voters: &[Address], threshold: usize) -> Result<(), GovernanceError> {
    invariant_non_empty(voters)?;
    invariant_distinct_members(voters)?;
    invariant_threshold_bounds(threshold, voters.len())
}
