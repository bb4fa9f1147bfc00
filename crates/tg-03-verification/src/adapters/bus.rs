//! # Event Bus Adapter
//!
//! ```text
//! [Verification (3)] ──notice──→ BusVerdictPublisher ──GateEvent──→ [Event Bus]
//!                                                                   │
//!                                  telemetry, door displays, audit ←┘
//! ```

use crate::domain::entities::VerificationNotice;
use crate::ports::outbound::VerdictPublisher;
use async_trait::async_trait;
use shared_bus::{EventPublisher, GateEvent};
use std::sync::Arc;
use tracing::debug;

/// Publishes verification notices as `GateEvent`s.
pub struct BusVerdictPublisher<P: EventPublisher> {
    publisher: Arc<P>,
}

impl<P: EventPublisher> BusVerdictPublisher<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }
}

impl From<VerificationNotice> for GateEvent {
    fn from(notice: VerificationNotice) -> Self {
        match notice {
            VerificationNotice::Redeemed {
                ticket_id,
                scope_id,
                owner_ref,
                used_at,
            } => GateEvent::TicketRedeemed {
                ticket_id,
                scope_id,
                owner_ref,
                used_at,
            },
            VerificationNotice::Rejected {
                ticket_id,
                scope_id,
                kind,
                detail,
            } => GateEvent::ScanRejected {
                ticket_id,
                scope_id,
                kind,
                detail,
            },
            VerificationNotice::Forgery {
                ticket_id,
                scope_id,
            } => GateEvent::ForgeryDetected {
                ticket_id,
                scope_id,
            },
            VerificationNotice::OwnershipDisagreement {
                ticket_id,
                scope_id,
                check,
            } => GateEvent::OwnershipDisagreement {
                ticket_id,
                scope_id,
                check,
            },
        }
    }
}

#[async_trait]
impl<P: EventPublisher> VerdictPublisher for BusVerdictPublisher<P> {
    async fn publish(&self, notice: VerificationNotice) {
        let event = GateEvent::from(notice);
        let topic = event.topic();
        let receivers = self.publisher.publish(event).await;
        debug!(?topic, receivers, "Published verification notice");
    }
}
