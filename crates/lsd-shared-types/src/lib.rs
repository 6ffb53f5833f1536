//! # Shared Types Crate
//!
//! Value objects used by every LSD network crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address` and `Hash` are defined once here.
//! - **Deterministic Derivation**: Deployed component and token addresses are
//!   derived from their deployer, never chosen by callers.

pub mod derivation;
pub mod value_objects;

pub use derivation::{
    compute_contract_address, compute_contract_address_create2, keccak256, keccak256_concat,
};
pub use value_objects::{Address, AddressParseError, Hash};
