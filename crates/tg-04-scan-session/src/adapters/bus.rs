//! # Event Bus Adapter
//!
//! Publishes `ScanSessionStarted` / `ScanSessionClosed`.

use crate::domain::entities::SessionReport;
use crate::ports::outbound::SessionObserver;
use async_trait::async_trait;
use shared_bus::{EventPublisher, GateEvent, SessionId};
use std::sync::Arc;

pub struct BusSessionObserver<P: EventPublisher> {
    publisher: Arc<P>,
}

impl<P: EventPublisher> BusSessionObserver<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl<P: EventPublisher> SessionObserver for BusSessionObserver<P> {
    async fn started(&self, session_id: SessionId) {
        self.publisher
            .publish(GateEvent::ScanSessionStarted { session_id })
            .await;
    }

    async fn closed(&self, report: &SessionReport) {
        self.publisher
            .publish(GateEvent::ScanSessionClosed {
                session_id: report.session_id,
                processed: report.stats.processed,
            })
            .await;
    }
}
