//! # Runtime Registries
//!
//! Shared state the event handlers act on: which scan sessions are open
//! for which operator, and which tickets this device is displaying.

use parking_lot::RwLock;
use shared_bus::SessionId;
use shared_types::{LedgerKey, ScopeId, TicketId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tg_04_scan_session::ScanSessionApi;
use tracing::info;

/// Open scan sessions keyed by operator account.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Vec<Arc<dyn ScanSessionApi>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account: impl Into<String>, session: Arc<dyn ScanSessionApi>) {
        let mut sessions = self.sessions.write();
        prune_closed(&mut sessions);
        sessions.entry(account.into()).or_default().push(session);
    }

    /// Cancels and forgets every session owned by `account`. Sessions that
    /// already ended are dropped without being reported.
    pub fn cancel_account(&self, account: &str) -> Vec<SessionId> {
        let owned = {
            let mut sessions = self.sessions.write();
            prune_closed(&mut sessions);
            sessions.remove(account)
        };
        owned
            .into_iter()
            .flatten()
            .map(|session| {
                session.cancel();
                info!(account, session_id = %session.session_id(), "Scan session cancelled");
                session.session_id()
            })
            .collect()
    }

    /// Cancels everything still open, used on shutdown.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut sessions = self.sessions.write();
            prune_closed(&mut sessions);
            sessions.drain().collect()
        };
        drained
            .into_iter()
            .flat_map(|(_, sessions)| sessions)
            .map(|session| session.cancel())
            .count()
    }

    /// Sessions still accepting input.
    pub fn open_count(&self) -> usize {
        let mut sessions = self.sessions.write();
        prune_closed(&mut sessions);
        sessions.values().map(Vec::len).sum()
    }
}

/// Drops handles whose session has ended, then accounts left with none.
fn prune_closed(sessions: &mut HashMap<String, Vec<Arc<dyn ScanSessionApi>>>) {
    sessions.retain(|_, owned| {
        owned.retain(|s| !s.is_closed());
        !owned.is_empty()
    });
}

/// Tickets currently rendered on this device's display.
#[derive(Debug, Default)]
pub struct DisplayedTickets {
    keys: RwLock<BTreeSet<LedgerKey>>,
}

impl DisplayedTickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, ticket_id: TicketId, scope_id: ScopeId) -> bool {
        self.keys.write().insert(LedgerKey::new(ticket_id, scope_id))
    }

    pub fn hide(&self, ticket_id: TicketId, scope_id: ScopeId) -> bool {
        self.keys.write().remove(&LedgerKey::new(ticket_id, scope_id))
    }

    pub fn snapshot(&self) -> Vec<LedgerKey> {
        self.keys.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}
