//! # Scan Session Controller
//!
//! One task per door scanner. Scans are verified one at a time; the
//! cool-down between them is a plain timer raced against new input and
//! the cancel signal.

use crate::domain::entities::{ExitReason, ScanInput, SessionConfig, SessionReport, SessionStats};
use crate::domain::errors::SessionError;
use crate::ports::inbound::ScanSessionApi;
use crate::ports::outbound::{NoOpSessionObserver, ScanSource, SessionObserver, VerdictSink};
use async_trait::async_trait;
use shared_bus::SessionId;
use std::sync::Arc;
use tg_03_verification::VerificationApi;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct ScanSessionController<V, S, D>
where
    V: VerificationApi,
    S: ScanSource,
    D: VerdictSink,
{
    session_id: SessionId,
    verifier: V,
    source: S,
    sink: D,
    config: SessionConfig,
    observer: Arc<dyn SessionObserver>,
}

impl<V, S, D> ScanSessionController<V, S, D>
where
    V: VerificationApi,
    S: ScanSource,
    D: VerdictSink,
{
    pub fn new(verifier: V, source: S, sink: D, config: SessionConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            verifier,
            source,
            sink,
            config,
            observer: Arc::new(NoOpSessionObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Drives the session until `cancel` flips to `true` (or its sender is
    /// dropped) or every input sender is gone. Releases the source exactly
    /// once before returning.
    ///
    /// Cancellation also interrupts a verification in flight. The scan is
    /// abandoned without a verdict and counted in `stats.abandoned`.
    pub async fn run(
        self,
        mut inputs: mpsc::Receiver<ScanInput>,
        mut cancel: watch::Receiver<bool>,
    ) -> SessionReport {
        let mut stats = SessionStats::default();
        let mut cooling_until: Option<Instant> = None;
        let mut camera_suspended = false;

        self.observer.started(self.session_id).await;
        info!(session_id = %self.session_id, "Scan session started");

        let exit = if *cancel.borrow_and_update() {
            ExitReason::Cancelled
        } else {
            loop {
                let cooldown_elapsed = async move {
                    match cooling_until {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                };

                tokio::select! {
                    biased;

                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break ExitReason::Cancelled;
                        }
                    }

                    () = cooldown_elapsed => {
                        cooling_until = None;
                        self.sink.clear().await;
                        if camera_suspended {
                            if let Err(e) = self.source.resume().await {
                                warn!(session_id = %self.session_id, error = %e, "Failed to resume scan source");
                            }
                            camera_suspended = false;
                        }
                    }

                    input = inputs.recv() => {
                        let Some(input) = input else {
                            break ExitReason::InputClosed;
                        };
                        if cooling_until.is_some() {
                            stats.dropped += 1;
                            debug!(origin = input.origin(), "Scan dropped during cool-down");
                            continue;
                        }

                        if input.is_camera() {
                            match self.source.suspend().await {
                                Ok(()) => camera_suspended = true,
                                Err(e) => warn!(error = %e, "Failed to suspend scan source"),
                            }
                        }
                        let verify = self.verifier.verify(input.payload());
                        tokio::pin!(verify);
                        let verdict = loop {
                            tokio::select! {
                                biased;

                                changed = cancel.changed() => {
                                    if changed.is_err() || *cancel.borrow() {
                                        break None;
                                    }
                                }

                                verdict = &mut verify => break Some(verdict),
                            }
                        };
                        let Some(verdict) = verdict else {
                            stats.abandoned += 1;
                            warn!(
                                session_id = %self.session_id,
                                origin = input.origin(),
                                "Scan abandoned on teardown"
                            );
                            break ExitReason::Cancelled;
                        };
                        stats.record(&verdict);
                        cooling_until = Some(Instant::now() + self.config.cooldown_after(&verdict));
                        debug!(
                            session_id = %self.session_id,
                            origin = input.origin(),
                            outcome = verdict.outcome_label(),
                            "Scan processed"
                        );
                        self.sink.show(&verdict).await;
                    }
                }
            }
        };

        self.source.release().await;
        let report = SessionReport {
            session_id: self.session_id,
            stats,
            exit,
        };
        info!(
            session_id = %self.session_id,
            exit = ?exit,
            processed = stats.processed,
            dropped = stats.dropped,
            accepted = stats.accepted,
            rejected = stats.rejected,
            abandoned = stats.abandoned,
            "Scan session closed"
        );
        self.observer.closed(&report).await;
        report
    }
}

impl<V, S, D> ScanSessionController<V, S, D>
where
    V: VerificationApi + 'static,
    S: ScanSource + 'static,
    D: VerdictSink + 'static,
{
    /// Runs the session on its own task.
    pub fn spawn(self) -> (ScanSessionHandle, JoinHandle<SessionReport>) {
        let (input_tx, input_rx) = mpsc::channel(self.config.input_buffer.max(1));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = ScanSessionHandle {
            session_id: self.session_id,
            inputs: input_tx,
            cancel: Arc::new(cancel_tx),
        };
        let task = tokio::spawn(self.run(input_rx, cancel_rx));
        (handle, task)
    }
}

/// Front-end side of a spawned session.
///
/// Dropping the last clone tears the session down.
#[derive(Debug, Clone)]
pub struct ScanSessionHandle {
    session_id: SessionId,
    inputs: mpsc::Sender<ScanInput>,
    cancel: Arc<watch::Sender<bool>>,
}

impl ScanSessionHandle {
    pub async fn submit_camera(&self, raw: impl Into<String>) -> Result<(), SessionError> {
        self.submit(ScanInput::Camera(raw.into())).await
    }

    pub async fn submit_manual(&self, raw: impl Into<String>) -> Result<(), SessionError> {
        self.submit(ScanInput::Manual(raw.into())).await
    }
}

#[async_trait]
impl ScanSessionApi for ScanSessionHandle {
    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn submit(&self, input: ScanInput) -> Result<(), SessionError> {
        self.inputs.send(input).await.map_err(|_| SessionError::Closed)
    }

    fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}
