//! # In-Memory Ownership Oracle
//!
//! A locally maintained view of on-chain ticket state. Used for demo door
//! deployments and tests; production wires a chain-backed oracle.

use crate::domain::errors::OracleError;
use crate::ports::outbound::OwnershipOracle;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ContractRef, OwnerRef, TicketId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ChainTicket {
    owner: OwnerRef,
    valid: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryOwnershipOracle {
    tickets: RwLock<HashMap<(ContractRef, TicketId), ChainTicket>>,
    offline: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryOwnershipOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the holder and validity of a ticket.
    pub fn set_ticket(&self, contract: ContractRef, ticket_id: TicketId, owner: OwnerRef, valid: bool) {
        self.tickets
            .write()
            .insert((contract, ticket_id), ChainTicket { owner, valid });
    }

    /// While offline every call fails with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Artificial delay applied to every call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    async fn lookup(&self, contract: &ContractRef, ticket_id: TicketId) -> Result<ChainTicket, OracleError> {
        let latency = *self.latency.read();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(OracleError::Unreachable("oracle offline".into()));
        }
        self.tickets
            .read()
            .get(&(contract.clone(), ticket_id))
            .cloned()
            .ok_or_else(|| OracleError::Unreachable(format!("ticket {ticket_id} unknown to {contract}")))
    }
}

#[async_trait]
impl OwnershipOracle for InMemoryOwnershipOracle {
    async fn current_owner(&self, contract: &ContractRef, ticket_id: TicketId) -> Result<OwnerRef, OracleError> {
        self.lookup(contract, ticket_id).await.map(|t| t.owner)
    }

    async fn is_ticket_valid(&self, contract: &ContractRef, ticket_id: TicketId) -> Result<bool, OracleError> {
        self.lookup(contract, ticket_id).await.map(|t| t.valid)
    }
}
