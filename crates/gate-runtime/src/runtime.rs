//! # Gate Runtime
//!
//! Owns the container, starts the bus handlers and applies console commands.
//!
//! ## Startup Sequence
//!
//! 1. Build the container (keyring, ledger, verifier, issuer)
//! 2. Start the session-event handler and the metrics recorder
//! 3. Open a scan session for the operator
//! 4. Feed console commands until quit or Ctrl+C

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventPublisher, EventTopic, GateEvent};
use shared_types::{OwnerRef, TicketRedemptionRecord};
use tg_02_redemption_ledger::RedemptionLedger;
use tg_04_scan_session::{ScanSessionApi, ScanSessionHandle};
use tokio::sync::watch;
use tracing::{error, info};

use crate::console::{CodeStyle, Command, HELP};
use crate::container::{ConfigError, GateConfig, GateContainer, OpenSession};
use crate::handlers::{MetricsRecorder, SessionEventHandler};

/// The door runtime orchestrating all subsystems.
pub struct GateRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<GateContainer>,
    /// Session that console scans are submitted to.
    session: Mutex<Option<ScanSessionHandle>>,
    /// Wallet currently connected on the ticket display.
    wallet: Mutex<Option<OwnerRef>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl GateRuntime {
    /// Create a new runtime from configuration.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_container(GateContainer::new(config)?))
    }

    pub fn from_container(container: GateContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            session: Mutex::new(None),
            wallet: Mutex::new(None),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<GateContainer> {
        Arc::clone(&self.container)
    }

    /// Start the event handlers. Must run inside a Tokio runtime.
    pub fn start(&self) {
        let container = &self.container;

        let session_events = SessionEventHandler::new(
            container
                .bus
                .subscribe(EventFilter::topics(vec![EventTopic::Auth, EventTopic::Wallet])),
            Arc::clone(&container.sessions),
            Arc::clone(&container.displayed),
            Arc::clone(&container.ledger),
            Arc::clone(&container.bus),
        );
        let mut session_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = session_events.run() => {}
                _ = session_shutdown.changed() => {
                    info!("[session-events] Shutdown signal received");
                }
            }
        });

        let recorder = MetricsRecorder::new(container.bus.event_stream(EventFilter::all()));
        let mut metrics_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = recorder.run() => {}
                _ = metrics_shutdown.changed() => {
                    info!("[metrics] Shutdown signal received");
                }
            }
        });

        info!("Event handlers started");
    }

    /// Open a scan session for the configured operator and make it the
    /// target of console scans.
    pub fn open_session(&self) -> OpenSession {
        let session = self
            .container
            .open_session(&self.container.config.session.operator);
        *self.session.lock() = Some(session.handle.clone());
        session
    }

    /// Apply one console command and return what to print.
    ///
    /// `Open` and `Quit` are handled by the console loop.
    pub async fn execute(&self, command: Command) -> Result<String> {
        let container = &self.container;
        match command {
            Command::Register {
                ticket_id,
                scope_id,
                owner,
            } => {
                container
                    .ledger
                    .register_ticket(TicketRedemptionRecord::issued(ticket_id, scope_id.clone(), owner))
                    .await?;
                Ok(format!("registered ticket {ticket_id} for {scope_id}"))
            }
            Command::Transfer {
                ticket_id,
                scope_id,
                owner,
            } => {
                let record = container
                    .ledger_events
                    .transfer_and_publish(ticket_id, &scope_id, owner)
                    .await?;
                Ok(format!(
                    "ticket {ticket_id} now held by {}",
                    record.owner_ref.map_or_else(|| "nobody".to_string(), |o| o.to_string())
                ))
            }
            Command::Show {
                ticket_id,
                scope_id,
                style,
            } => {
                let qr = match style {
                    CodeStyle::Rotating => container.issuer.generate_code(ticket_id, &scope_id).await,
                    CodeStyle::Static => {
                        container.issuer.generate_static_code(ticket_id, &scope_id).await
                    }
                };
                container.displayed.show(ticket_id, scope_id);
                Ok(qr)
            }
            Command::Hide {
                ticket_id,
                scope_id,
            } => {
                let was_shown = container.displayed.hide(ticket_id, scope_id);
                Ok(if was_shown { "hidden" } else { "not displayed" }.to_string())
            }
            Command::Chain {
                ticket_id,
                scope_id,
                owner,
                valid,
            } => {
                let contract = container
                    .config
                    .verification
                    .directory()
                    .contract_for(&scope_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("no contract configured for {scope_id} (TG_SCOPE_CONTRACTS)"))?;
                container
                    .oracle
                    .set_ticket(contract.clone(), ticket_id, owner.clone(), valid);
                Ok(format!("chain: {contract} #{ticket_id} held by {owner}, valid={valid}"))
            }
            Command::Oracle { online } => {
                container.oracle.set_offline(!online);
                Ok(format!("oracle {}", if online { "online" } else { "offline" }))
            }
            Command::Wallet(current) => {
                let previous = std::mem::replace(&mut *self.wallet.lock(), current.clone());
                container
                    .bus
                    .publish(GateEvent::WalletChanged { previous, current })
                    .await;
                Ok("wallet updated".to_string())
            }
            Command::SignOut(account) => {
                let account = account.unwrap_or_else(|| container.config.session.operator.clone());
                container
                    .bus
                    .publish(GateEvent::SessionSignedOut {
                        account: account.clone(),
                    })
                    .await;
                Ok(format!("{account} signed out"))
            }
            Command::Scan(input) => {
                let session = self
                    .session
                    .lock()
                    .clone()
                    .filter(|s| !s.is_closed())
                    .ok_or_else(|| anyhow!("no open scan session (use `open`)"))?;
                session
                    .submit(input)
                    .await
                    .context("scan session ended")?;
                Ok(String::new())
            }
            Command::Metrics => Ok(gate_telemetry::gather_text()?),
            Command::Help => Ok(HELP.to_string()),
            Command::Open | Command::Quit => Ok(String::new()),
        }
    }

    /// Shutdown the runtime gracefully.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Cancel every scan session (each releases its source)
    /// 2. Signal shutdown to all handlers
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        let cancelled = self.container.sessions.cancel_all();
        info!(sessions = cancelled, "Scan sessions cancelled");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        tokio::task::yield_now().await;

        info!("Shutdown complete");
    }
}
