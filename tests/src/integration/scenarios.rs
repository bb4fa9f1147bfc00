//! # Door Scenarios
//!
//! The issue → scan → re-scan lifecycle with real services and a manual
//! clock shared by issuer and verifier.
//!
//! | Scenario | Input | Verdict |
//! |----------|-------|---------|
//! | first scan | fresh rotating code | valid, ledger marked used |
//! | re-scan | same code again | `AlreadyRedeemed` with the first commit time |
//! | stale screenshot | rotating code 31s old | `Expired` |
//! | tampered code | one signature bit flipped | `ForgedOrCorrupt`, no ledger traffic |
//! | unknown ticket | valid code, no record | `UnknownTicket` |

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use shared_types::{
        ContractRef, ErrorKind, ManualClock, OwnerRef, OwnershipCheck, ScopeId, TicketId,
        TicketRedemptionRecord, Timestamp,
    };
    use tg_01_qr_codes::{
        decode, encode, verify_code, CodeIssuanceApi, CodeIssuer, RandomNonceSource,
        SigningKeyring, SigningSecret,
    };
    use tg_02_redemption_ledger::{
        InMemoryRecordStore, LedgerClient, LedgerError, RedemptionError, RedemptionLedger,
        RedemptionReceipt,
    };
    use tg_03_verification::{
        InMemoryOwnershipOracle, OwnershipCheckMode, ScopeDirectory, VerificationApi,
        VerificationPolicy, VerificationService,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const T0: Timestamp = 1_700_000_000;

    fn event_7() -> ScopeId {
        ScopeId::new("event-7").unwrap()
    }

    fn keyring() -> Arc<SigningKeyring> {
        Arc::new(SigningKeyring::new(SigningSecret::new(vec![0x42; 32]).unwrap()))
    }

    /// Ledger wrapper that counts every call reaching it.
    struct CountingLedger<L> {
        inner: L,
        calls: AtomicUsize,
    }

    impl<L> CountingLedger<L> {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<L: RedemptionLedger> RedemptionLedger for CountingLedger<L> {
        async fn lookup(
            &self,
            ticket_id: TicketId,
            scope_id: &ScopeId,
        ) -> Result<TicketRedemptionRecord, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(ticket_id, scope_id).await
        }

        async fn mark_used(
            &self,
            ticket_id: TicketId,
            scope_id: &ScopeId,
            used_at: Timestamp,
        ) -> Result<RedemptionReceipt, RedemptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.mark_used(ticket_id, scope_id, used_at).await
        }

        async fn register_ticket(&self, record: TicketRedemptionRecord) -> Result<(), LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.register_ticket(record).await
        }

        async fn transfer_owner(
            &self,
            ticket_id: TicketId,
            scope_id: &ScopeId,
            new_owner: OwnerRef,
        ) -> Result<TicketRedemptionRecord, RedemptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.transfer_owner(ticket_id, scope_id, new_owner).await
        }
    }

    type Ledger = CountingLedger<LedgerClient<InMemoryRecordStore>>;

    struct Door {
        clock: Arc<ManualClock>,
        issuer: CodeIssuer<Arc<ManualClock>, RandomNonceSource>,
        verifier: Arc<VerificationService<Arc<Ledger>, Arc<ManualClock>>>,
        ledger: Arc<Ledger>,
    }

    /// Ticket 42 of event-7 held by 0xHolder, unused.
    fn door() -> Door {
        door_with(|service| service)
    }

    fn door_with(
        configure: impl FnOnce(
            VerificationService<Arc<Ledger>, Arc<ManualClock>>,
        ) -> VerificationService<Arc<Ledger>, Arc<ManualClock>>,
    ) -> Door {
        let keyring = keyring();
        let clock = Arc::new(ManualClock::new(T0));
        let ledger = Arc::new(CountingLedger {
            inner: LedgerClient::new(InMemoryRecordStore::with_records([
                TicketRedemptionRecord::issued(
                    TicketId(42),
                    event_7(),
                    Some(OwnerRef::new("0xHolder")),
                ),
            ])),
            calls: AtomicUsize::new(0),
        });
        let verifier = configure(VerificationService::new(
            Arc::clone(&keyring),
            Arc::clone(&ledger),
            Arc::clone(&clock),
        ));
        Door {
            issuer: CodeIssuer::new(keyring, Arc::clone(&clock), RandomNonceSource),
            clock,
            verifier: Arc::new(verifier),
            ledger,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_first_scan_admits_and_marks_ledger() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(42), &event_7());
        door.clock.advance(3);

        let verdict = door.verifier.verify(&qr).await;
        assert!(verdict.is_valid, "{verdict}");
        assert_eq!(verdict.ticket_id, Some(TicketId(42)));
        assert_eq!(verdict.scope_id, Some(event_7()));
        assert_eq!(verdict.owner_ref, Some(OwnerRef::new("0xHolder")));
        assert_eq!(verdict.used_at, Some(T0 + 3));

        let record = door.ledger.lookup(TicketId(42), &event_7()).await.unwrap();
        assert!(record.is_used);
        assert_eq!(record.used_at, Some(T0 + 3));
    }

    #[tokio::test]
    async fn test_rescan_reports_first_commit_time() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(42), &event_7());
        door.clock.advance(2);
        let first = door.verifier.verify(&qr).await;
        assert!(first.is_valid);

        door.clock.advance(10);
        let second = door.verifier.verify(&qr).await;
        assert!(!second.is_valid);
        assert_eq!(second.error_kind(), Some(ErrorKind::AlreadyRedeemed));
        assert_eq!(second.is_used, Some(true));
        assert_eq!(second.used_at, first.used_at);
    }

    #[tokio::test]
    async fn test_fresh_code_for_redeemed_ticket_is_still_rejected() {
        let door = door();
        let first = door.issuer.generate_code(TicketId(42), &event_7());
        assert!(door.verifier.verify(&first).await.is_valid);

        door.clock.advance(20);
        let rotated = door.issuer.generate_code(TicketId(42), &event_7());
        assert_ne!(first, rotated);
        let verdict = door.verifier.verify(&rotated).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::AlreadyRedeemed));
        assert_eq!(verdict.used_at, Some(T0));
    }

    #[tokio::test]
    async fn test_stale_screenshot_expires() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(42), &event_7());
        door.clock.advance(31);

        let verdict = door.verifier.verify(&qr).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::Expired));
        assert_eq!(verdict.ticket_id, Some(TicketId(42)));

        let record = door.ledger.lookup(TicketId(42), &event_7()).await.unwrap();
        assert!(!record.is_used);
    }

    #[tokio::test]
    async fn test_rotating_code_at_window_edge_is_accepted() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(42), &event_7());
        door.clock.advance(30);
        assert!(door.verifier.verify(&qr).await.is_valid);
    }

    #[tokio::test]
    async fn test_printed_ticket_outlives_rotating_window() {
        let door = door();
        let qr = door.issuer.generate_static_code(TicketId(42), &event_7());
        door.clock.advance(3_600);
        assert!(door.verifier.verify(&qr).await.is_valid);
    }

    #[tokio::test]
    async fn test_flipped_signature_bit_never_reaches_ledger() {
        let door = door();
        let mut code = door.issuer.mint_rotating(TicketId(42), &event_7());
        code.signature[0] ^= 0x01;

        let verdict = door.verifier.verify(&encode(&code)).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::ForgedOrCorrupt));
        assert_eq!(door.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_code_for_other_event_is_forged() {
        let door = door();
        let mut code = door.issuer.mint_rotating(TicketId(42), &event_7());
        code.claims.scope_id = ScopeId::new("event-8").unwrap();

        let verdict = door.verifier.verify(&encode(&code)).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::ForgedOrCorrupt));
        assert_eq!(door.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ticket() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(999), &event_7());

        let verdict = door.verifier.verify(&qr).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::UnknownTicket));
        assert_eq!(verdict.ticket_id, Some(TicketId(999)));
    }

    #[tokio::test]
    async fn test_garbage_payloads_are_invalid_format() {
        let door = door();
        for raw in ["", "hello", "{}", r#"{"ticketId":"x","eventId":"event-7"}"#] {
            let verdict = door.verifier.verify(raw).await;
            assert_eq!(verdict.error_kind(), Some(ErrorKind::InvalidFormat), "{raw:?}");
            assert_eq!(verdict.ticket_id, None);
        }
        assert_eq!(door.ledger.calls(), 0);
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_admit_exactly_once() {
        let door = door();
        let qr = door.issuer.generate_code(TicketId(42), &event_7());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let verifier = Arc::clone(&door.verifier);
                let qr = qr.clone();
                tokio::spawn(async move { verifier.verify(&qr).await })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            let verdict = task.await.unwrap();
            if verdict.is_valid {
                admitted += 1;
            } else {
                assert_eq!(verdict.error_kind(), Some(ErrorKind::AlreadyRedeemed));
                assert_eq!(verdict.used_at, Some(T0));
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mark_used_has_one_winner() {
        let ledger = Arc::new(LedgerClient::new(InMemoryRecordStore::with_records([
            TicketRedemptionRecord::issued(TicketId(1), event_7(), None),
        ])));

        let tasks: Vec<_> = (0..32u64)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move { ledger.mark_used(TicketId(1), &event_7(), T0 + i).await })
            })
            .collect();

        let mut winners = Vec::new();
        let mut losers = Vec::new();
        for task in tasks {
            match task.await.unwrap() {
                Ok(receipt) => winners.push(receipt.used_at),
                Err(RedemptionError::AlreadyUsed { used_at }) => losers.push(used_at),
                Err(other) => panic!("unexpected {other}"),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(losers.len(), 31);
        assert!(losers.iter().all(|t| *t == Some(winners[0])));
    }

    // =========================================================================
    // OWNERSHIP
    // =========================================================================

    fn contract() -> ContractRef {
        ContractRef("0xc0ffee".into())
    }

    fn with_oracle(
        mode: OwnershipCheckMode,
        oracle: Arc<InMemoryOwnershipOracle>,
    ) -> impl FnOnce(
        VerificationService<Arc<Ledger>, Arc<ManualClock>>,
    ) -> VerificationService<Arc<Ledger>, Arc<ManualClock>> {
        move |service| {
            service
                .with_policy(VerificationPolicy {
                    ownership_mode: mode,
                    ..VerificationPolicy::default()
                })
                .with_oracle(oracle, ScopeDirectory::new().with_contract(event_7(), contract()))
        }
    }

    #[tokio::test]
    async fn test_required_check_rejects_offline_oracle_without_redeeming() {
        let oracle = Arc::new(InMemoryOwnershipOracle::new());
        oracle.set_offline(true);
        let door = door_with(with_oracle(OwnershipCheckMode::Required, oracle.clone()));
        let qr = door.issuer.generate_code(TicketId(42), &event_7());

        let verdict = door.verifier.verify(&qr).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::TransientFailure));
        assert!(matches!(verdict.ownership, OwnershipCheck::Unavailable { .. }));
        let record = door.ledger.lookup(TicketId(42), &event_7()).await.unwrap();
        assert!(!record.is_used);

        oracle.set_offline(false);
        oracle.set_ticket(contract(), TicketId(42), OwnerRef::new("0xholder"), true);
        let retry = door.verifier.verify(&qr).await;
        assert!(retry.is_valid, "{retry}");
        assert!(matches!(retry.ownership, OwnershipCheck::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_required_check_rejects_ticket_burned_on_chain() {
        let oracle = Arc::new(InMemoryOwnershipOracle::new());
        oracle.set_ticket(contract(), TicketId(42), OwnerRef::new("0xHolder"), false);
        let door = door_with(with_oracle(OwnershipCheckMode::Required, oracle));
        let qr = door.issuer.generate_code(TicketId(42), &event_7());

        let verdict = door.verifier.verify(&qr).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::OwnershipMismatch));
        assert_eq!(verdict.ownership, OwnershipCheck::TicketInvalidOnChain);
    }

    #[tokio::test]
    async fn test_advisory_check_never_changes_the_verdict() {
        let oracle = Arc::new(InMemoryOwnershipOracle::new());
        oracle.set_ticket(contract(), TicketId(42), OwnerRef::new("0xSomeoneElse"), true);
        let door = door_with(with_oracle(OwnershipCheckMode::Advisory, oracle));
        let qr = door.issuer.generate_code(TicketId(42), &event_7());

        let verdict = door.verifier.verify(&qr).await;
        assert!(verdict.is_valid, "{verdict}");
        assert!(matches!(verdict.ownership, OwnershipCheck::OwnerDiffers { .. }));
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #[test]
        fn prop_any_signature_bit_flip_is_detected(byte in 0usize..32, bit in 0u8..8) {
            let keyring = keyring();
            let issuer = CodeIssuer::new(
                Arc::clone(&keyring),
                Arc::new(ManualClock::new(T0)),
                RandomNonceSource,
            );
            let mut code = issuer.mint_rotating(TicketId(42), &event_7());
            prop_assert!(verify_code(&code, &keyring));

            code.signature[byte] ^= 1 << bit;
            let decoded = decode(&encode(&code)).unwrap();
            prop_assert!(!verify_code(&decoded, &keyring));
        }

        #[test]
        fn prop_minted_codes_survive_the_wire(ticket in any::<u64>(), scope in "[a-z0-9-]{1,24}") {
            let keyring = keyring();
            let issuer = CodeIssuer::new(
                Arc::clone(&keyring),
                Arc::new(ManualClock::new(T0)),
                RandomNonceSource,
            );
            let scope = ScopeId::new(scope).unwrap();
            let decoded = decode(&issuer.generate_code(TicketId(ticket), &scope)).unwrap();
            prop_assert_eq!(decoded.ticket_id(), TicketId(ticket));
            prop_assert!(verify_code(&decoded, &keyring));
        }
    }
}
