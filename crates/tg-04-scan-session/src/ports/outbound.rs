//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::SessionReport;
use crate::domain::errors::SourceError;
use async_trait::async_trait;
use shared_bus::SessionId;
use shared_types::VerificationVerdict;

/// The continuous input device (camera).
#[async_trait]
pub trait ScanSource: Send + Sync {
    /// Stop delivering frames.
    async fn suspend(&self) -> Result<(), SourceError>;

    async fn resume(&self) -> Result<(), SourceError>;

    /// Give the device back. Called exactly once, at teardown.
    async fn release(&self);
}

/// Where verdicts are shown to door staff.
#[async_trait]
pub trait VerdictSink: Send + Sync {
    async fn show(&self, verdict: &VerificationVerdict);

    /// Remove the last verdict once the cool-down ends.
    async fn clear(&self);
}

/// Session lifecycle notifications.
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn started(&self, session_id: SessionId);

    async fn closed(&self, report: &SessionReport);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSessionObserver;

#[async_trait]
impl SessionObserver for NoOpSessionObserver {
    async fn started(&self, _session_id: SessionId) {}

    async fn closed(&self, _report: &SessionReport) {}
}

#[async_trait]
impl<T: ScanSource + ?Sized> ScanSource for std::sync::Arc<T> {
    async fn suspend(&self) -> Result<(), SourceError> {
        (**self).suspend().await
    }

    async fn resume(&self) -> Result<(), SourceError> {
        (**self).resume().await
    }

    async fn release(&self) {
        (**self).release().await
    }
}
