//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::ScanInput;
use crate::domain::errors::SessionError;
use async_trait::async_trait;
use shared_bus::SessionId;

/// Feeding and tearing down a running session.
#[async_trait]
pub trait ScanSessionApi: Send + Sync {
    fn session_id(&self) -> SessionId;

    /// Hands a raw payload to the session. Dropped there if cooling down.
    ///
    /// # Errors
    /// * `SessionError::Closed` - the session has ended
    async fn submit(&self, input: ScanInput) -> Result<(), SessionError>;

    /// Requests teardown. Idempotent.
    fn cancel(&self);

    fn is_closed(&self) -> bool;
}
