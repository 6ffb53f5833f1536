//! # Domain Module
//!
//! Core domain types for network provisioning.

pub mod bundle;
pub mod entities;
pub mod invariants;
pub mod registry;

pub use bundle::{component_salt, AdminSpec, BundleBuilder, BundleRequest, StagedNetwork};
pub use entities::*;
pub use invariants::*;
pub use registry::Registry;
