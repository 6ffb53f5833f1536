//! # Domain Invariants
//!
//! Rules every creation must satisfy before anything is committed.

use crate::domain::entities::{InstanceBundle, LogicTemplates};
use crate::errors::FactoryError;
use lsd_governance::validate_delay;
use lsd_shared_types::Address;
use std::collections::BTreeSet;

/// Invariant: every bundle address is non-zero and unique within the bundle.
pub fn invariant_bundle_addresses(bundle: &InstanceBundle) -> Result<(), FactoryError> {
    if bundle.token.address.is_zero() {
        return Err(FactoryError::InvalidAddress("token"));
    }
    if bundle.admin.is_zero() {
        return Err(FactoryError::InvalidAddress("admin"));
    }

    let mut seen = BTreeSet::new();
    seen.insert(bundle.token.address);
    for (kind, address) in bundle.components() {
        if address.is_zero() {
            return Err(FactoryError::InvalidAddress(kind.as_str()));
        }
        if !seen.insert(address) {
            return Err(FactoryError::ComponentAlreadyBound(address));
        }
    }
    Ok(())
}

/// Invariant: `address` is not the zero address.
pub fn invariant_non_zero(address: &Address, field: &'static str) -> Result<(), FactoryError> {
    if address.is_zero() {
        return Err(FactoryError::InvalidAddress(field));
    }
    Ok(())
}

/// Invariant: every proxied component has a logic template.
pub fn invariant_templates_complete(templates: &LogicTemplates) -> Result<(), FactoryError> {
    match templates.first_missing() {
        Some(kind) => Err(FactoryError::InvalidAddress(kind.as_str())),
        None => Ok(()),
    }
}

/// Invariant: voter list within the configured size limit.
pub fn invariant_voter_limit(voters: &[Address], max: usize) -> Result<(), FactoryError> {
    if voters.len() > max {
        return Err(FactoryError::TooManyVoters {
            count: voters.len(),
            max,
        });
    }
    Ok(())
}

/// Invariant: token name and symbol are non-empty and within limits.
pub fn invariant_token_metadata(
    name: &str,
    symbol: &str,
    max_name_len: usize,
    max_symbol_len: usize,
) -> Result<(), FactoryError> {
    if name.trim().is_empty() {
        return Err(FactoryError::InvalidTokenMetadata("empty name".to_string()));
    }
    if symbol.trim().is_empty() {
        return Err(FactoryError::InvalidTokenMetadata("empty symbol".to_string()));
    }
    if name.chars().count() > max_name_len {
        return Err(FactoryError::InvalidTokenMetadata(format!(
            "name longer than {max_name_len} characters"
        )));
    }
    if symbol.chars().count() > max_symbol_len {
        return Err(FactoryError::InvalidTokenMetadata(format!(
            "symbol longer than {max_symbol_len} characters"
        )));
    }
    Ok(())
}

/// Invariant: timelock parameters are usable.
///
/// Checked before any component is deployed so a bad request costs nothing.
pub fn invariant_timelock_params(delay: i64, controllers: &[Address]) -> Result<(), FactoryError> {
    validate_delay(delay)?;
    if controllers.is_empty() {
        return Err(lsd_governance::GovernanceError::EmptyTimelockControllers.into());
    }
    if controllers.iter().any(Address::is_zero) {
        return Err(FactoryError::InvalidAddress("timelock controller"));
    }
    Ok(())
}
