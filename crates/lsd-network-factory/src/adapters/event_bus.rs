//! # In-Memory Factory Bus
//!
//! `tokio::sync::broadcast` publisher for factory events.

use crate::events::EventEnvelope;
use crate::ports::outbound::FactoryEventPublisher;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast bus for factory events.
pub struct InMemoryFactoryBus {
    sender: broadcast::Sender<EventEnvelope>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryFactoryBus {
    /// Bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus with `capacity` buffered events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryFactoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactoryEventPublisher for InMemoryFactoryBus {
    async fn publish(&self, envelope: EventEnvelope) -> usize {
        let topic = envelope.topic.clone();
        let sequence = envelope.sequence;
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(envelope) {
            Ok(receivers) => {
                debug!(topic = %topic, sequence, receivers, "Event published");
                receivers
            }
            Err(_) => {
                warn!(topic = %topic, sequence, "Event published with no subscribers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
