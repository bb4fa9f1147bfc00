//! # Metered Verifier
//!
//! Wraps any `VerificationApi` and records every verdict: outcome counter,
//! latency histogram, oracle failures and one structured log line.

use async_trait::async_trait;
use gate_telemetry::metrics::{record_scan, ORACLE_FAILURES_TOTAL, VERIFICATION_DURATION};
use gate_telemetry::{log_scan_event, time_histogram};
use shared_types::{OwnershipCheck, VerificationVerdict};
use tg_03_verification::VerificationApi;

pub struct MeteredVerifier<V: VerificationApi> {
    inner: V,
}

impl<V: VerificationApi> MeteredVerifier<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }
}

#[async_trait]
impl<V: VerificationApi> VerificationApi for MeteredVerifier<V> {
    async fn verify(&self, raw: &str) -> VerificationVerdict {
        let verdict = {
            let _timer = time_histogram!(VERIFICATION_DURATION);
            self.inner.verify(raw).await
        };

        record_scan(verdict.outcome_label());
        if matches!(verdict.ownership, OwnershipCheck::Unavailable { .. }) {
            ORACLE_FAILURES_TOTAL.inc();
        }

        match verdict.error_kind() {
            None => log_scan_event!(info, verdict, "Ticket admitted"),
            Some(kind) if kind.is_security_event() => {
                log_scan_event!(warn, verdict, "Scan rejected", security_event = true)
            }
            Some(_) => log_scan_event!(info, verdict, "Scan rejected"),
        }
        verdict
    }
}
