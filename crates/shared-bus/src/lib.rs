//! # Shared Bus - Typed Event Bus
//!
//! Replaces ambient, globally registered listeners (auth changes, wallet
//! switches) with explicit messages that handlers subscribe to by topic.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │ Verification │    publish()       │ Session handler  │
//! │ (tg-03)      │ ──────┐            │ (runtime)        │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐           │
//!                  │  Event Bus   │ ──────────┘
//!                  └──────────────┘  subscribe(filter)
//! ```
//!
//! Events are ephemeral: a publish with no subscribers is dropped and
//! logged, never queued.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, GateEvent, SessionId};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Current protocol version for event bus messages.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Dead Letter Queue topic name for critical errors.
pub const DLQ_TOPIC: &str = "dlq.critical";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
