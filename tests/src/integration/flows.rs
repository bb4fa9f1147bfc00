//! # Integration Test Flows
//!
//! Tests that the issuer, verifier, ledger and scan session work together
//! through the shared bus.
//!
//! ## Flows Tested:
//!
//! 1. **Issuance (1) → bus**: every minted code is announced as `CodeIssued`
//! 2. **Verification (3) → bus**: redemptions, rejections and forgeries
//! 3. **Scan session (4)**: camera scan suspends the source, cool-down clears the display
//! 4. **Auth → runtime**: sign-out tears down only that operator's sessions

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use gate_runtime::{GateConfig, GateContainer, GateRuntime};
    use shared_bus::{EventFilter, EventPublisher, EventTopic, GateEvent, InMemoryEventBus, Subscription};
    use shared_types::{ErrorKind, ManualClock, OwnerRef, ScopeId, TicketId, TicketRedemptionRecord, Timestamp};
    use tg_01_qr_codes::{
        encode, CodeIssuanceApi, CodeIssuer, IssuanceBusAdapter, RandomNonceSource, SigningKeyring,
        SigningSecret,
    };
    use tg_02_redemption_ledger::{InMemoryRecordStore, LedgerClient, RedemptionLedger};
    use tg_03_verification::{BusVerdictPublisher, VerificationApi, VerificationService};
    use tg_04_scan_session::{
        BusSessionObserver, ChannelVerdictSink, DisplayUpdate, ExitReason, InMemoryScanSource,
        ScanSessionApi, ScanSessionController, SessionConfig,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const T0: Timestamp = 1_700_000_000;
    const WAIT: Duration = Duration::from_secs(5);

    fn scope() -> ScopeId {
        ScopeId::new("event-7").unwrap()
    }

    struct Stack {
        bus: Arc<InMemoryEventBus>,
        clock: Arc<ManualClock>,
        issuer: IssuanceBusAdapter<CodeIssuer<Arc<ManualClock>, RandomNonceSource>, InMemoryEventBus>,
        verifier: Arc<VerificationService<Arc<LedgerClient<InMemoryRecordStore>>, Arc<ManualClock>>>,
    }

    fn stack() -> Stack {
        let keyring = Arc::new(SigningKeyring::new(SigningSecret::new(vec![0x42; 32]).unwrap()));
        let clock = Arc::new(ManualClock::new(T0));
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Arc::new(LedgerClient::new(InMemoryRecordStore::with_records([
            TicketRedemptionRecord::issued(TicketId(42), scope(), Some(OwnerRef::new("0xHolder"))),
        ])));
        let verifier = VerificationService::new(Arc::clone(&keyring), ledger, Arc::clone(&clock))
            .with_publisher(Arc::new(BusVerdictPublisher::new(Arc::clone(&bus))));
        let issuer = IssuanceBusAdapter::new(
            Arc::new(CodeIssuer::new(keyring, Arc::clone(&clock), RandomNonceSource)),
            Arc::clone(&bus),
        );
        Stack {
            bus,
            clock,
            issuer,
            verifier: Arc::new(verifier),
        }
    }

    async fn next(sub: &mut Subscription) -> GateEvent {
        timeout(WAIT, sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    // =============================================================================
    // ISSUANCE AND VERIFICATION → EVENT BUS
    // =============================================================================

    #[tokio::test]
    async fn test_issue_then_redeem_publishes_lifecycle() {
        let s = stack();
        let mut issued = s.bus.subscribe(EventFilter::topics(vec![EventTopic::Issuance]));
        let mut redemptions = s.bus.subscribe(EventFilter::topics(vec![EventTopic::Redemption]));

        let qr = s.issuer.generate_code(TicketId(42), &scope()).await;
        match next(&mut issued).await {
            GateEvent::CodeIssued {
                ticket_id,
                issued_at,
                kind,
                ..
            } => {
                assert_eq!(ticket_id, TicketId(42));
                assert_eq!(issued_at, T0);
                assert_eq!(kind, "rotating");
            }
            other => panic!("unexpected {other:?}"),
        }

        s.clock.advance(4);
        assert!(s.verifier.verify(&qr).await.is_valid);
        assert_eq!(
            next(&mut redemptions).await,
            GateEvent::TicketRedeemed {
                ticket_id: TicketId(42),
                scope_id: scope(),
                owner_ref: Some(OwnerRef::new("0xHolder")),
                used_at: T0 + 4,
            }
        );

        assert!(!s.verifier.verify(&qr).await.is_valid);
        match next(&mut redemptions).await {
            GateEvent::ScanRejected { ticket_id, kind, .. } => {
                assert_eq!(ticket_id, Some(TicketId(42)));
                assert_eq!(kind, ErrorKind::AlreadyRedeemed);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_static_code_is_announced_as_legacy() {
        let s = stack();
        let mut issued = s.bus.subscribe(EventFilter::topics(vec![EventTopic::Issuance]));

        let qr = s.issuer.generate_static_code(TicketId(42), &scope()).await;
        assert!(matches!(
            next(&mut issued).await,
            GateEvent::CodeIssued { kind, .. } if kind == "legacy"
        ));

        s.clock.advance(600);
        assert!(s.verifier.verify(&qr).await.is_valid);
    }

    #[tokio::test]
    async fn test_forgery_raises_security_event() {
        let s = stack();
        let mut security = s.bus.subscribe(EventFilter::topics(vec![EventTopic::Security]));

        let mut code = s.issuer.service().mint_rotating(TicketId(42), &scope());
        code.signature[31] ^= 0x80;
        let verdict = s.verifier.verify(&encode(&code)).await;
        assert_eq!(verdict.error_kind(), Some(ErrorKind::ForgedOrCorrupt));

        assert_eq!(
            next(&mut security).await,
            GateEvent::ForgeryDetected {
                ticket_id: TicketId(42),
                scope_id: scope(),
            }
        );
        let record = s.verifier.ledger().lookup(TicketId(42), &scope()).await.unwrap();
        assert!(!record.is_used);
    }

    // =============================================================================
    // SCAN SESSION
    // =============================================================================

    #[tokio::test]
    async fn test_camera_scan_through_session() {
        let s = stack();
        let mut lifecycle = s.bus.subscribe(EventFilter::topics(vec![EventTopic::ScanSession]));
        let source = Arc::new(InMemoryScanSource::new());
        let (sink, mut display) = ChannelVerdictSink::new();
        let config = SessionConfig {
            cooldown: Duration::from_millis(50),
            ..SessionConfig::default()
        };
        let (handle, task) = ScanSessionController::new(
            Arc::clone(&s.verifier),
            Arc::clone(&source),
            sink,
            config,
        )
        .with_observer(Arc::new(BusSessionObserver::new(Arc::clone(&s.bus))))
        .spawn();

        assert!(matches!(
            next(&mut lifecycle).await,
            GateEvent::ScanSessionStarted { session_id } if session_id == handle.session_id()
        ));

        let qr = s.issuer.generate_code(TicketId(42), &scope()).await;
        handle.submit_camera(qr).await.unwrap();

        match timeout(WAIT, display.recv()).await.unwrap().unwrap() {
            DisplayUpdate::Show(verdict) => assert!(verdict.is_valid, "{verdict}"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(timeout(WAIT, display.recv()).await.unwrap(), Some(DisplayUpdate::Clear));
        assert_eq!(source.suspend_count(), 1);
        assert_eq!(source.resume_count(), 1);

        handle.cancel();
        let report = timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(report.exit, ExitReason::Cancelled);
        assert_eq!(report.stats.accepted, 1);
        assert_eq!(source.release_count(), 1);
        assert_eq!(
            next(&mut lifecycle).await,
            GateEvent::ScanSessionClosed {
                session_id: handle.session_id(),
                processed: 1,
            }
        );
    }

    // =============================================================================
    // AUTH → RUNTIME
    // =============================================================================

    #[tokio::test]
    async fn test_sign_out_only_ends_that_operators_sessions() {
        let runtime = GateRuntime::from_container(GateContainer::new(GateConfig::default()).unwrap());
        runtime.start();
        let container = runtime.container();

        let door_a = container.open_session("door-a");
        let door_b = container.open_session("door-b");
        assert_eq!(container.sessions.open_count(), 2);

        container
            .bus
            .publish(GateEvent::SessionSignedOut {
                account: "door-a".into(),
            })
            .await;

        let report = timeout(WAIT, door_a.task).await.unwrap().unwrap();
        assert_eq!(report.exit, ExitReason::Cancelled);
        assert!(door_a.source.is_released());
        assert!(!door_b.handle.is_closed());
        assert!(!door_b.source.is_released());

        runtime.shutdown().await;
        let report = timeout(WAIT, door_b.task).await.unwrap().unwrap();
        assert_eq!(report.exit, ExitReason::Cancelled);
    }
}
