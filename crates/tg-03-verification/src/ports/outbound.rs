//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::VerificationNotice;
use crate::domain::errors::OracleError;
use async_trait::async_trait;
use shared_types::{ContractRef, OwnerRef, TicketId};

/// Read-only view of on-chain ticket state.
///
/// The pipeline bounds every call with its own timeout, so implementations
/// need not.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// Current holder of `ticket_id` under `contract`.
    async fn current_owner(
        &self,
        contract: &ContractRef,
        ticket_id: TicketId,
    ) -> Result<OwnerRef, OracleError>;

    /// Whether the contract still considers the ticket valid.
    async fn is_ticket_valid(
        &self,
        contract: &ContractRef,
        ticket_id: TicketId,
    ) -> Result<bool, OracleError>;
}

/// Where verification outcomes are announced.
#[async_trait]
pub trait VerdictPublisher: Send + Sync {
    async fn publish(&self, notice: VerificationNotice);
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpVerdictPublisher;

#[async_trait]
impl VerdictPublisher for NoOpVerdictPublisher {
    async fn publish(&self, _notice: VerificationNotice) {}
}
