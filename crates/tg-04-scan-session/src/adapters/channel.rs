//! # Channel Verdict Sink
//!
//! Forwards display updates over an mpsc channel to whatever renders them.

use crate::ports::outbound::VerdictSink;
use async_trait::async_trait;
use shared_types::VerificationVerdict;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    Show(VerificationVerdict),
    Clear,
}

#[derive(Debug, Clone)]
pub struct ChannelVerdictSink {
    tx: mpsc::UnboundedSender<DisplayUpdate>,
}

impl ChannelVerdictSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DisplayUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, update: DisplayUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Display receiver gone, update discarded");
        }
    }
}

#[async_trait]
impl VerdictSink for ChannelVerdictSink {
    async fn show(&self, verdict: &VerificationVerdict) {
        self.send(DisplayUpdate::Show(verdict.clone()));
    }

    async fn clear(&self) {
        self.send(DisplayUpdate::Clear);
    }
}
