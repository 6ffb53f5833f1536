//! Shared fixtures for the integration flows.

use async_trait::async_trait;
use lsd_network_factory::{
    DeterministicDeployer, EventEnvelope, FactoryEventPublisher, FactoryServiceConfig,
    InMemoryFactoryBus, InitializeParams, LogicTemplates, ManualChainContext, NetworkFactoryApi,
    NetworkFactoryService,
};
use lsd_shared_types::Address;
use lsd_telemetry::{init_telemetry, TelemetryConfig};
use parking_lot::Mutex;
use std::sync::Arc;

/// Factory wired to the deterministic deployer, a manual clock and an in-memory bus.
pub type TestFactory =
    NetworkFactoryService<DeterministicDeployer, ManualChainContext, InMemoryFactoryBus>;

/// Factory admin.
pub const ADMIN: Address = Address::repeat_byte(0xad);

/// Default creator.
pub const CREATOR: Address = Address::repeat_byte(0xc1);

/// Network admin handed to created bundles.
pub const NETWORK_ADMIN: Address = Address::repeat_byte(0xa0);

/// External deposit target.
pub const DEPOSIT_TARGET: Address = Address::repeat_byte(0xde);

/// Voter `n`.
pub fn voter(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// One template per proxied component.
pub fn templates() -> LogicTemplates {
    LogicTemplates {
        fee_pool: Address::repeat_byte(0x11),
        network_balances: Address::repeat_byte(0x12),
        network_proposal: Address::repeat_byte(0x13),
        node_deposit: Address::repeat_byte(0x14),
        user_deposit: Address::repeat_byte(0x15),
        network_withdraw: Address::repeat_byte(0x16),
    }
}

/// Parameters for `initialize`.
pub fn init_params() -> InitializeParams {
    InitializeParams {
        admin: ADMIN,
        external_deposit_target: DEPOSIT_TARGET,
        logic_templates: templates(),
    }
}

/// Handles a test needs around a factory.
pub struct Harness {
    /// The factory.
    pub factory: Arc<TestFactory>,
    /// Its clock.
    pub chain: Arc<ManualChainContext>,
    /// Its event bus.
    pub bus: Arc<InMemoryFactoryBus>,
}

/// Uninitialized factory using `deployer`.
pub fn harness_with(deployer: DeterministicDeployer) -> Harness {
    let chain = Arc::new(ManualChainContext::new(1, 1_700_000_000));
    let bus = Arc::new(InMemoryFactoryBus::with_capacity(256));
    let factory = Arc::new(NetworkFactoryService::new(
        FactoryServiceConfig::for_testing(),
        Arc::new(deployer),
        chain.clone(),
        bus.clone(),
    ));
    Harness {
        factory,
        chain,
        bus,
    }
}

/// Initialized factory with the default deployer.
pub async fn initialized() -> Harness {
    let harness = harness_with(DeterministicDeployer::new());
    harness
        .factory
        .initialize(ADMIN, init_params())
        .await
        .expect("initialize");
    harness
}

/// Publisher that keeps every envelope it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    envelopes: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    /// Everything published so far, in publish order.
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.envelopes.lock().clone()
    }
}

#[async_trait]
impl FactoryEventPublisher for RecordingPublisher {
    async fn publish(&self, envelope: EventEnvelope) -> usize {
        self.envelopes.lock().push(envelope);
        1
    }

    fn events_published(&self) -> u64 {
        self.envelopes.lock().len() as u64
    }
}

/// Quiet log subscriber for tests that want `RUST_LOG` output.
pub fn init_test_logging() {
    let config = TelemetryConfig {
        console_output: std::env::var("RUST_LOG").is_ok(),
        ..TelemetryConfig::for_service("lsd-tests")
    };
    // Another test may have installed it already
    let _ = init_telemetry(&config);
}
