//! # Factory Metrics
//!
//! Prometheus metrics for network provisioning.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! lsd-network-factory = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `lsd_factory_networks_created_total` - Networks created, by creation kind
//! - `lsd_factory_rejections_total` - Rejected operations, by error code
//! - `lsd_governance_votes_total` - Votes accepted by network governances

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Networks created, labeled by creation kind
    pub static ref NETWORKS_CREATED: IntCounterVec = register_int_counter_vec!(
        "lsd_factory_networks_created_total",
        "Total number of networks created",
        &["kind"]
    )
    .expect("Failed to create NETWORKS_CREATED metric");

    /// Rejected operations, labeled by error code
    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "lsd_factory_rejections_total",
        "Total number of rejected factory operations",
        &["reason"]
    )
    .expect("Failed to create REJECTIONS metric");

    /// Votes accepted
    pub static ref GOVERNANCE_VOTES: IntCounter = register_int_counter!(
        "lsd_governance_votes_total",
        "Total number of governance votes accepted"
    )
    .expect("Failed to create GOVERNANCE_VOTES metric");
}

/// Record a created network
#[cfg(feature = "metrics")]
pub fn record_network_created(kind: &str) {
    NETWORKS_CREATED.with_label_values(&[kind]).inc();
}

/// Record a rejected operation
#[cfg(feature = "metrics")]
pub fn record_rejection(reason: &str) {
    REJECTIONS.with_label_values(&[reason]).inc();
}

/// Record an accepted vote
#[cfg(feature = "metrics")]
pub fn record_vote() {
    GOVERNANCE_VOTES.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_network_created(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejection(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote() {}
