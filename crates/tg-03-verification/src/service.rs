//! # Verification Service
//!
//! Runs the scan pipeline. Holds no locks of its own; the ledger's
//! conditional write is the only serialization point, so any number of
//! scanners may share one service.

use crate::domain::entities::{
    OwnershipCheckMode, ScopeDirectory, VerificationNotice, VerificationPolicy,
};
use crate::domain::errors::OracleError;
use crate::ports::inbound::VerificationApi;
use crate::ports::outbound::{OwnershipOracle, VerdictPublisher};
use async_trait::async_trait;
use shared_types::{
    CodeClaims, ContractRef, ErrorKind, OwnershipCheck, TicketRedemptionRecord, TimeSource,
    VerificationVerdict,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tg_01_qr_codes::{decode, verify_code, SigningKeyring};
use tg_02_redemption_ledger::{LedgerError, RedemptionError, RedemptionLedger};
use tracing::{debug, info, warn};

pub struct VerificationService<L: RedemptionLedger, C: TimeSource> {
    keyring: Arc<SigningKeyring>,
    ledger: L,
    clock: C,
    policy: VerificationPolicy,
    directory: ScopeDirectory,
    oracle: Option<Arc<dyn OwnershipOracle>>,
    publisher: Arc<dyn VerdictPublisher>,
}

impl<L: RedemptionLedger, C: TimeSource> VerificationService<L, C> {
    /// Ledger-only service with default freshness windows.
    pub fn new(keyring: Arc<SigningKeyring>, ledger: L, clock: C) -> Self {
        Self {
            keyring,
            ledger,
            clock,
            policy: VerificationPolicy::default(),
            directory: ScopeDirectory::default(),
            oracle: None,
            publisher: Arc::new(crate::ports::outbound::NoOpVerdictPublisher),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables the ownership cross-check against `oracle`.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn OwnershipOracle>, directory: ScopeDirectory) -> Self {
        self.oracle = Some(oracle);
        self.directory = directory;
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn VerdictPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    async fn run_pipeline(&self, raw: &str) -> VerificationVerdict {
        // Stage 1: decode
        let code = match decode(raw) {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "Scan rejected: undecodable payload");
                return VerificationVerdict::rejected(ErrorKind::InvalidFormat, e.to_string());
            }
        };
        let claims = &code.claims;
        let ticket_id = claims.ticket_id;
        let scope_id = claims.scope_id.clone();
        let reject = |kind: ErrorKind, detail: String| {
            VerificationVerdict::rejected(kind, detail).with_ticket(ticket_id, scope_id.clone())
        };

        // Stage 2: signature
        if !verify_code(&code, &self.keyring) {
            warn!(
                security_event = true,
                ticket_id = %ticket_id,
                scope_id = %scope_id,
                kind = claims.kind.label(),
                "Signature mismatch on scanned code"
            );
            self.publisher
                .publish(VerificationNotice::Forgery {
                    ticket_id,
                    scope_id: scope_id.clone(),
                })
                .await;
            return reject(
                ErrorKind::ForgedOrCorrupt,
                "signature does not match payload".into(),
            );
        }

        // Stage 3: freshness
        let now = self.clock.now();
        if let Err(expired) = self.policy.freshness.check(claims, now) {
            debug!(ticket_id = %ticket_id, age = expired.age, "Scan rejected: expired");
            return reject(ErrorKind::Expired, expired.to_string());
        }

        // Stage 4: ledger lookup
        let record = match self.ledger.lookup(ticket_id, &scope_id).await {
            Ok(record) => record,
            Err(LedgerError::NotFound(key)) => {
                return reject(ErrorKind::UnknownTicket, format!("no ticket {key} in ledger"));
            }
            Err(e) => return reject(ErrorKind::TransientFailure, e.to_string()),
        };

        // Stage 5: prior use
        if record.is_used {
            return reject(ErrorKind::AlreadyRedeemed, "ticket already redeemed".into())
                .with_owner(record.owner_ref.clone())
                .with_prior_use(record.used_at);
        }

        // Fail-closed cross-check runs before anything is written.
        let mut ownership = OwnershipCheck::NotRequested;
        if self.policy.ownership_mode == OwnershipCheckMode::Required {
            ownership = self.check_ownership(claims, &record).await;
            match &ownership {
                OwnershipCheck::Unavailable { reason } => {
                    return reject(
                        ErrorKind::TransientFailure,
                        format!("ownership check unavailable: {reason}"),
                    )
                    .with_owner(record.owner_ref.clone())
                    .with_ownership(ownership.clone());
                }
                OwnershipCheck::TicketInvalidOnChain => {
                    warn!(
                        security_event = true,
                        ticket_id = %ticket_id,
                        scope_id = %scope_id,
                        "Ticket not valid on chain"
                    );
                    return reject(
                        ErrorKind::OwnershipMismatch,
                        "ticket is not valid on chain".into(),
                    )
                    .with_owner(record.owner_ref.clone())
                    .with_ownership(ownership.clone());
                }
                _ => {}
            }
        }

        // Stage 6: redeem
        let receipt = match self.ledger.mark_used(ticket_id, &scope_id, now).await {
            Ok(receipt) => receipt,
            Err(RedemptionError::AlreadyUsed { used_at }) => {
                info!(ticket_id = %ticket_id, "Lost redemption race");
                return reject(ErrorKind::AlreadyRedeemed, "ticket already redeemed".into())
                    .with_owner(record.owner_ref.clone())
                    .with_prior_use(used_at);
            }
            Err(RedemptionError::NotFound(key)) => {
                return reject(ErrorKind::UnknownTicket, format!("no ticket {key} in ledger"));
            }
            Err(e) => {
                return reject(ErrorKind::TransientFailure, e.to_string())
                    .with_owner(record.owner_ref.clone())
            }
        };

        if self.policy.ownership_mode == OwnershipCheckMode::Advisory {
            ownership = self.check_ownership(claims, &record).await;
        }

        let redeemed = TicketRedemptionRecord {
            owner_ref: receipt.owner_ref.clone(),
            ..record
        };
        VerificationVerdict::accepted(&redeemed, receipt.used_at).with_ownership(ownership)
    }

    /// Asks the oracle about the ticket, each call bounded by the oracle timeout.
    async fn check_ownership(
        &self,
        claims: &CodeClaims,
        record: &TicketRedemptionRecord,
    ) -> OwnershipCheck {
        let Some(oracle) = &self.oracle else {
            return OwnershipCheck::Unavailable {
                reason: "no ownership oracle configured".into(),
            };
        };
        let Some(contract) = self.directory.contract_for(&claims.scope_id) else {
            return OwnershipCheck::Unavailable {
                reason: OracleError::UnknownScope(claims.scope_id.clone()).to_string(),
            };
        };

        let check = self.query_oracle(oracle.as_ref(), contract, claims, record).await;
        if let OwnershipCheck::OwnerDiffers { .. } | OwnershipCheck::TicketInvalidOnChain = check {
            self.publisher
                .publish(VerificationNotice::OwnershipDisagreement {
                    ticket_id: claims.ticket_id,
                    scope_id: claims.scope_id.clone(),
                    check: check.clone(),
                })
                .await;
        }
        if let OwnershipCheck::Unavailable { reason } = &check {
            warn!(ticket_id = %claims.ticket_id, %reason, "Ownership oracle unavailable");
        }
        check
    }

    async fn query_oracle(
        &self,
        oracle: &dyn OwnershipOracle,
        contract: &ContractRef,
        claims: &CodeClaims,
        record: &TicketRedemptionRecord,
    ) -> OwnershipCheck {
        let timeout = self.policy.oracle_timeout;
        let ticket_id = claims.ticket_id;

        match bounded(timeout, oracle.is_ticket_valid(contract, ticket_id)).await {
            Ok(true) => {}
            Ok(false) => return OwnershipCheck::TicketInvalidOnChain,
            Err(e) => {
                return OwnershipCheck::Unavailable {
                    reason: e.to_string(),
                }
            }
        }

        match bounded(timeout, oracle.current_owner(contract, ticket_id)).await {
            Ok(chain) => match &record.owner_ref {
                Some(ledger) if ledger.same_holder(&chain) => OwnershipCheck::Confirmed { owner: chain },
                ledger => OwnershipCheck::OwnerDiffers {
                    ledger: ledger.clone(),
                    chain,
                },
            },
            Err(e) => OwnershipCheck::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, OracleError>
where
    F: Future<Output = Result<T, OracleError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| OracleError::Timeout(limit))?
}

#[async_trait]
impl<L: RedemptionLedger, C: TimeSource> VerificationApi for VerificationService<L, C> {
    async fn verify(&self, raw: &str) -> VerificationVerdict {
        let verdict = self.run_pipeline(raw).await;

        let notice = match (&verdict.error, verdict.ticket_id, &verdict.scope_id) {
            (None, Some(ticket_id), Some(scope_id)) => {
                debug!(
                    ticket_id = %ticket_id,
                    scope_id = %scope_id,
                    used_at = ?verdict.used_at,
                    "Scan accepted"
                );
                VerificationNotice::Redeemed {
                    ticket_id,
                    scope_id: scope_id.clone(),
                    owner_ref: verdict.owner_ref.clone(),
                    used_at: verdict.used_at.unwrap_or_default(),
                }
            }
            (Some(err), ticket_id, scope_id) => {
                debug!(
                    ticket_id = ?ticket_id,
                    kind = %err.kind,
                    detail = %err.detail,
                    "Scan rejected"
                );
                VerificationNotice::Rejected {
                    ticket_id,
                    scope_id: scope_id.clone(),
                    kind: err.kind,
                    detail: err.detail.clone(),
                }
            }
            (None, _, _) => return verdict,
        };
        self.publisher.publish(notice).await;
        verdict
    }
}
