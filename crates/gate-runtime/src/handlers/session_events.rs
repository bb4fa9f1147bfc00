//! # Session Event Handler
//!
//! Turns auth and wallet events into actions:
//!
//! ```text
//! SessionSignedOut ──→ cancel that operator's scan sessions
//! WalletChanged    ──→ compare displayed tickets with ledger holders
//!                          └──→ WalletMismatch (per ticket not held)
//! ```

use crate::adapters::{DisplayedTickets, SessionRegistry};
use shared_bus::{EventPublisher, GateEvent, Subscription};
use shared_types::{LedgerKey, OwnerRef};
use std::sync::Arc;
use tg_02_redemption_ledger::{LedgerError, RedemptionLedger};
use tracing::{debug, info, warn};

pub struct SessionEventHandler<L: RedemptionLedger, P: EventPublisher> {
    subscription: Subscription,
    sessions: Arc<SessionRegistry>,
    displayed: Arc<DisplayedTickets>,
    ledger: Arc<L>,
    publisher: Arc<P>,
}

impl<L: RedemptionLedger, P: EventPublisher> SessionEventHandler<L, P> {
    /// `subscription` should cover the `Auth` and `Wallet` topics.
    pub fn new(
        subscription: Subscription,
        sessions: Arc<SessionRegistry>,
        displayed: Arc<DisplayedTickets>,
        ledger: Arc<L>,
        publisher: Arc<P>,
    ) -> Self {
        Self {
            subscription,
            sessions,
            displayed,
            ledger,
            publisher,
        }
    }

    /// Run the handler loop until the bus closes.
    pub async fn run(mut self) {
        info!("Session event handler started");
        while let Some(event) = self.subscription.recv().await {
            self.handle(event).await;
        }
        debug!("Session event handler stopped");
    }

    async fn handle(&self, event: GateEvent) {
        match event {
            GateEvent::SessionSignedOut { account } => {
                let cancelled = self.sessions.cancel_account(&account);
                info!(%account, sessions = cancelled.len(), "Operator signed out");
            }
            GateEvent::WalletChanged {
                current: Some(wallet),
                ..
            } => {
                let mismatches = self.check_wallet(&wallet).await;
                info!(wallet = %wallet, mismatches, "Wallet changed");
            }
            GateEvent::WalletChanged { current: None, .. } => {
                info!("Wallet disconnected");
            }
            _ => {}
        }
    }

    /// Publishes `WalletMismatch` for every displayed ticket whose ledger
    /// holder is not `wallet`. Returns how many were published.
    async fn check_wallet(&self, wallet: &OwnerRef) -> usize {
        let mut mismatches = 0;
        for key in self.displayed.snapshot() {
            let Some(expected) = self.ledger_holder(&key).await else {
                continue;
            };
            if expected.same_holder(wallet) {
                continue;
            }
            warn!(ticket_id = %key.ticket_id, scope_id = %key.scope_id, "Displayed ticket not held by wallet");
            self.publisher
                .publish(GateEvent::WalletMismatch {
                    ticket_id: key.ticket_id,
                    scope_id: key.scope_id,
                    expected,
                    connected: wallet.clone(),
                })
                .await;
            mismatches += 1;
        }
        mismatches
    }

    async fn ledger_holder(&self, key: &LedgerKey) -> Option<OwnerRef> {
        match self.ledger.lookup(key.ticket_id, &key.scope_id).await {
            Ok(record) => record.owner_ref,
            Err(LedgerError::NotFound(_)) => {
                debug!(%key, "Displayed ticket not in ledger");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "Ledger lookup failed during wallet check");
                None
            }
        }
    }
}
