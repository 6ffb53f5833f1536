//! # Chain Context Adapters
//!
//! Block number and clock sources for the factory.

use crate::ports::outbound::ChainContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Manually driven chain context. Tests advance it explicitly.
#[derive(Debug, Default)]
pub struct ManualChainContext {
    block: AtomicU64,
    timestamp: AtomicU64,
}

impl ManualChainContext {
    /// Start at `block` / `timestamp`.
    pub fn new(block: u64, timestamp: u64) -> Self {
        Self {
            block: AtomicU64::new(block),
            timestamp: AtomicU64::new(timestamp),
        }
    }

    /// Move to a new block, `seconds` later.
    pub fn advance(&self, seconds: u64) {
        self.block.fetch_add(1, Ordering::SeqCst);
        self.timestamp.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp.
    pub fn set_timestamp(&self, timestamp: u64) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }
}

impl ChainContext for ManualChainContext {
    fn block_number(&self) -> u64 {
        self.block.load(Ordering::SeqCst)
    }

    fn timestamp(&self) -> u64 {
        self.timestamp.load(Ordering::SeqCst)
    }
}

/// Default seconds per block for `SystemChainContext`.
pub const DEFAULT_SLOT_SECONDS: u64 = 12;

/// Wall-clock chain context. Block numbers count fixed-length slots since
/// a genesis timestamp.
#[derive(Debug, Clone, Copy)]
pub struct SystemChainContext {
    genesis: u64,
    slot_seconds: u64,
}

impl SystemChainContext {
    /// Slots counted from the Unix epoch at the default slot length.
    pub fn new() -> Self {
        Self::with_genesis(0, DEFAULT_SLOT_SECONDS)
    }

    /// Slots of `slot_seconds` counted from `genesis`. Block 1 starts at genesis.
    pub fn with_genesis(genesis: u64, slot_seconds: u64) -> Self {
        Self {
            genesis,
            slot_seconds: slot_seconds.max(1),
        }
    }
}

impl Default for SystemChainContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainContext for SystemChainContext {
    fn block_number(&self) -> u64 {
        let elapsed = self.timestamp().saturating_sub(self.genesis);
        elapsed / self.slot_seconds + 1
    }

    fn timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
