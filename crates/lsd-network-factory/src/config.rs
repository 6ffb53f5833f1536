//! Factory service configuration from environment variables.

use crate::adapters::DEFAULT_CHANNEL_CAPACITY;
use lsd_shared_types::Address;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Address the factory deploys from when none is configured.
pub const DEFAULT_FACTORY_ADDRESS: Address = Address::new([
    0x1f, 0xac, 0x70, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
]);

/// Configuration for `NetworkFactoryService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryServiceConfig {
    /// Account the factory deploys components and tokens from.
    pub factory_address: Address,

    /// Buffered events per bus subscriber.
    pub event_capacity: usize,

    /// Largest voter set accepted for one network.
    pub max_voters: usize,

    /// Longest token name, in characters.
    pub max_name_len: usize,

    /// Longest token symbol, in characters.
    pub max_symbol_len: usize,
}

impl Default for FactoryServiceConfig {
    fn default() -> Self {
        Self {
            factory_address: DEFAULT_FACTORY_ADDRESS,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_voters: 256,
            max_name_len: 64,
            max_symbol_len: 11,
        }
    }
}

impl FactoryServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LSD_FACTORY_ADDRESS`: hex factory address (default: built-in)
    /// - `LSD_EVENT_CAPACITY`: event bus capacity (default: 1024)
    /// - `LSD_MAX_VOTERS`: voter set limit (default: 256)
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let factory_address = match env::var("LSD_FACTORY_ADDRESS") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(value = %raw, error = %err, "Ignoring invalid LSD_FACTORY_ADDRESS");
                defaults.factory_address
            }),
            Err(_) => defaults.factory_address,
        };

        Self {
            factory_address,
            event_capacity: env::var("LSD_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_capacity),
            max_voters: env::var("LSD_MAX_VOTERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_voters),
            ..defaults
        }
    }

    /// Small limits for tests.
    pub fn for_testing() -> Self {
        Self {
            factory_address: Address::repeat_byte(0xfa),
            event_capacity: 64,
            max_voters: 16,
            ..Self::default()
        }
    }
}
