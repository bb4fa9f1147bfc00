//! # Gate Events
//!
//! Every message that flows through the shared bus.
//!
//! | Source | Id |
//! |--------|----|
//! | Runtime (auth / wallet adapters) | 0 |
//! | QR codes (tg-01) | 1 |
//! | Redemption ledger (tg-02) | 2 |
//! | Verification (tg-03) | 3 |
//! | Scan session (tg-04) | 4 |

use serde::{Deserialize, Serialize};
use shared_types::{ErrorKind, OwnerRef, OwnershipCheck, ScopeId, TicketId, Timestamp};
use uuid::Uuid;

/// Identifier of one door-scanner session.
pub type SessionId = Uuid;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEvent {
    // =========================================================================
    // RUNTIME: AUTH & WALLET
    // =========================================================================
    /// The signed-in operator signed out. Scan sessions they own must be
    /// torn down.
    SessionSignedOut {
        /// Operator account.
        account: String,
    },

    /// The connected wallet changed (connect, switch or disconnect).
    WalletChanged {
        /// Previously connected wallet.
        previous: Option<OwnerRef>,
        /// Newly connected wallet, `None` on disconnect.
        current: Option<OwnerRef>,
    },

    /// The connected wallet does not hold a ticket it is displaying.
    WalletMismatch {
        /// Ticket being displayed.
        ticket_id: TicketId,
        /// Event the ticket belongs to.
        scope_id: ScopeId,
        /// Holder according to the ledger.
        expected: OwnerRef,
        /// Wallet currently connected.
        connected: OwnerRef,
    },

    // =========================================================================
    // TG-01: QR CODES
    // =========================================================================
    /// A code was minted for a ticket display.
    CodeIssued {
        /// Ticket the code is bound to.
        ticket_id: TicketId,
        /// Event the code is bound to.
        scope_id: ScopeId,
        /// Mint time.
        issued_at: Timestamp,
        /// `rotating` or `legacy`.
        kind: String,
    },

    // =========================================================================
    // TG-02: REDEMPTION LEDGER
    // =========================================================================
    /// Ticket ownership moved to a new holder (resale/transfer).
    TicketTransferred {
        /// Transferred ticket.
        ticket_id: TicketId,
        /// Event the ticket belongs to.
        scope_id: ScopeId,
        /// New holder.
        new_owner: OwnerRef,
    },

    // =========================================================================
    // TG-03: VERIFICATION
    // =========================================================================
    /// A ticket was redeemed at the door.
    TicketRedeemed {
        /// Redeemed ticket.
        ticket_id: TicketId,
        /// Event the ticket belongs to.
        scope_id: ScopeId,
        /// Holder recorded in the ledger.
        owner_ref: Option<OwnerRef>,
        /// Commit time of the redemption.
        used_at: Timestamp,
    },

    /// A scan was rejected.
    ScanRejected {
        /// Ticket, when the payload decoded far enough.
        ticket_id: Option<TicketId>,
        /// Scope, when the payload decoded far enough.
        scope_id: Option<ScopeId>,
        /// Rejection category.
        kind: ErrorKind,
        /// Human-readable reason.
        detail: String,
    },

    /// A payload with a bad signature was presented.
    ForgeryDetected {
        /// Claimed ticket.
        ticket_id: TicketId,
        /// Claimed scope.
        scope_id: ScopeId,
    },

    /// The on-chain cross-check disagreed with the ledger.
    OwnershipDisagreement {
        /// Ticket checked.
        ticket_id: TicketId,
        /// Event the ticket belongs to.
        scope_id: ScopeId,
        /// What the oracle reported.
        check: OwnershipCheck,
    },

    // =========================================================================
    // TG-04: SCAN SESSION
    // =========================================================================
    /// A scan session started.
    ScanSessionStarted {
        /// Session id.
        session_id: SessionId,
    },

    /// A scan session ended and released its input source.
    ScanSessionClosed {
        /// Session id.
        session_id: SessionId,
        /// Scans processed during the session.
        processed: u64,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        /// The subsystem that encountered the error.
        subsystem_id: u8,
        /// Error description.
        error: String,
    },
}

impl GateEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SessionSignedOut { .. } => EventTopic::Auth,
            Self::WalletChanged { .. } | Self::WalletMismatch { .. } => EventTopic::Wallet,
            Self::CodeIssued { .. } => EventTopic::Issuance,
            Self::TicketTransferred { .. } => EventTopic::Ledger,
            Self::TicketRedeemed { .. } | Self::ScanRejected { .. } => EventTopic::Redemption,
            Self::ForgeryDetected { .. } | Self::OwnershipDisagreement { .. } => {
                EventTopic::Security
            }
            Self::ScanSessionStarted { .. } | Self::ScanSessionClosed { .. } => {
                EventTopic::ScanSession
            }
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::SessionSignedOut { .. }
            | Self::WalletChanged { .. }
            | Self::WalletMismatch { .. } => 0,
            Self::CodeIssued { .. } => 1,
            Self::TicketTransferred { .. } => 2,
            Self::TicketRedeemed { .. }
            | Self::ScanRejected { .. }
            | Self::ForgeryDetected { .. }
            | Self::OwnershipDisagreement { .. } => 3,
            Self::ScanSessionStarted { .. } | Self::ScanSessionClosed { .. } => 4,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Operator sign-in/out.
    Auth,
    /// Wallet connection changes.
    Wallet,
    /// Code minting.
    Issuance,
    /// Ledger mutations other than redemption.
    Ledger,
    /// Scan outcomes.
    Redemption,
    /// Forgery and ownership alerts.
    Security,
    /// Scan session lifecycle.
    ScanSession,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &GateEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
