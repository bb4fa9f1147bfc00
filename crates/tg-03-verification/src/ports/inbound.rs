//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;
use shared_types::VerificationVerdict;
use std::sync::Arc;

/// Door-side verification entry point.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Verifies a scanned payload and, if every check passes, redeems the
    /// ticket. Never fails: every outcome is a verdict.
    async fn verify(&self, raw: &str) -> VerificationVerdict;
}

#[async_trait]
impl<T: VerificationApi + ?Sized> VerificationApi for Arc<T> {
    async fn verify(&self, raw: &str) -> VerificationVerdict {
        (**self).verify(raw).await
    }
}
