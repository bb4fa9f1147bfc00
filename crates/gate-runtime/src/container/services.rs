//! # Subsystem Container
//!
//! Holds the subsystem instances and hands out scan sessions.
//!
//! ```text
//! Keyring ──→ CodeIssuer ──CodeIssued──────────────┐
//!    │                                              ↓
//!    └────→ VerificationService ──Redeemed/...──→ Event Bus
//!                 │        │                        ↑
//!           LedgerClient  Oracle        ScanSession─┘
//! ```

use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use shared_types::SystemTimeSource;
use tg_01_qr_codes::adapters::{IssuanceBusAdapter, RandomNonceSource};
use tg_01_qr_codes::{CodeIssuer, SigningKeyring};
use tg_02_redemption_ledger::adapters::LedgerBusAdapter;
use tg_02_redemption_ledger::{InMemoryRecordStore, LedgerClient, RecordStore};
use tg_03_verification::{
    BusVerdictPublisher, InMemoryOwnershipOracle, OwnershipOracle, VerificationService,
};
use tg_04_scan_session::{
    BusSessionObserver, ChannelVerdictSink, DisplayUpdate, InMemoryScanSource, ScanSessionApi,
    ScanSessionController, ScanSessionHandle, SessionReport,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::{DisplayedTickets, MeteredVerifier, SessionRegistry};
use crate::container::config::{ConfigError, GateConfig, StorageConfig};

/// Ledger client over whichever store the configuration selects.
pub type GateLedger = LedgerClient<Arc<dyn RecordStore>>;

/// Verification pipeline with metrics.
pub type GateVerifier = MeteredVerifier<VerificationService<Arc<GateLedger>, SystemTimeSource>>;

/// Code issuer announcing on the bus.
pub type GateIssuer =
    IssuanceBusAdapter<CodeIssuer<SystemTimeSource, RandomNonceSource>, InMemoryEventBus>;

/// Central container holding all subsystem instances.
pub struct GateContainer {
    /// Configuration the container was built from.
    pub config: GateConfig,

    /// Shared event bus.
    pub bus: Arc<InMemoryEventBus>,

    /// Secrets shared by issuer and verifier.
    pub keyring: Arc<SigningKeyring>,

    /// Redemption ledger (TG-02).
    pub ledger: Arc<GateLedger>,

    /// Ledger writes that announce themselves (transfers).
    pub ledger_events: LedgerBusAdapter<GateLedger, InMemoryEventBus>,

    /// Ownership oracle. In-memory until a chain client is wired in.
    pub oracle: Arc<InMemoryOwnershipOracle>,

    /// Verification pipeline (TG-03).
    pub verifier: Arc<GateVerifier>,

    /// Code issuance (TG-01).
    pub issuer: GateIssuer,

    /// Open scan sessions by operator.
    pub sessions: Arc<SessionRegistry>,

    /// Tickets on this device's display.
    pub displayed: Arc<DisplayedTickets>,
}

/// A scan session started by [`GateContainer::open_session`].
pub struct OpenSession {
    pub handle: ScanSessionHandle,
    pub display: UnboundedReceiver<DisplayUpdate>,
    pub source: Arc<InMemoryScanSource>,
    pub task: JoinHandle<SessionReport>,
}

impl GateContainer {
    /// Build every subsystem, opening the configured ledger store.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        let store = open_store(&config.storage)?;
        Self::with_store(config, store)
    }

    /// Build every subsystem on top of `store`.
    pub fn with_store(config: GateConfig, store: Arc<dyn RecordStore>) -> Result<Self, ConfigError> {
        let keyring = Arc::new(config.security.keyring()?);
        if keyring.default_secret().is_all_zero() {
            warn!("Signing with the all-zero development secret");
        }
        info!(
            fingerprint = %keyring.default_secret().fingerprint(),
            scoped = keyring.scoped_count(),
            "Keyring loaded"
        );

        let bus = Arc::new(InMemoryEventBus::new());

        let ledger = Arc::new(LedgerClient::new(store));
        let ledger_events = LedgerBusAdapter::new(Arc::clone(&ledger), Arc::clone(&bus));

        let oracle = Arc::new(InMemoryOwnershipOracle::new());
        let service = VerificationService::new(
            Arc::clone(&keyring),
            Arc::clone(&ledger),
            SystemTimeSource,
        )
        .with_policy(config.verification_policy())
        .with_oracle(
            Arc::clone(&oracle) as Arc<dyn OwnershipOracle>,
            config.verification.directory(),
        )
        .with_publisher(Arc::new(BusVerdictPublisher::new(Arc::clone(&bus))));
        let verifier = Arc::new(MeteredVerifier::new(service));

        let issuer = IssuanceBusAdapter::new(
            Arc::new(CodeIssuer::new(
                Arc::clone(&keyring),
                SystemTimeSource,
                RandomNonceSource,
            )),
            Arc::clone(&bus),
        );

        info!(
            ownership = %config.verification.ownership_mode,
            rotating_max_age = config.freshness.rotating.max_age_secs,
            static_max_age = config.freshness.legacy.max_age_secs,
            "Subsystems initialized"
        );

        Ok(Self {
            config,
            bus,
            keyring,
            ledger,
            ledger_events,
            oracle,
            verifier,
            issuer,
            sessions: Arc::new(SessionRegistry::new()),
            displayed: Arc::new(DisplayedTickets::new()),
        })
    }

    /// Spawn a scan session owned by `account` and register it so a
    /// sign-out tears it down.
    pub fn open_session(&self, account: &str) -> OpenSession {
        let (sink, display) = ChannelVerdictSink::new();
        let source = Arc::new(InMemoryScanSource::new());
        let (handle, task) = ScanSessionController::new(
            Arc::clone(&self.verifier),
            Arc::clone(&source),
            sink,
            self.config.session.scan,
        )
        .with_observer(Arc::new(BusSessionObserver::new(Arc::clone(&self.bus))))
        .spawn();

        self.sessions.register(account, Arc::new(handle.clone()));
        info!(account, session_id = %handle.session_id(), "Scan session opened");

        OpenSession {
            handle,
            display,
            source,
            task,
        }
    }
}

#[cfg(feature = "rocksdb")]
fn open_store(storage: &StorageConfig) -> Result<Arc<dyn RecordStore>, ConfigError> {
    use tg_02_redemption_ledger::RocksDbRecordStore;

    match &storage.ledger_path {
        Some(path) => {
            let store = RocksDbRecordStore::open_default(path)
                .map_err(|e| ConfigError::Storage(e.to_string()))?;
            info!(path = %path.display(), "Opened RocksDB ledger");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryRecordStore::new())),
    }
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(storage: &StorageConfig) -> Result<Arc<dyn RecordStore>, ConfigError> {
    match &storage.ledger_path {
        Some(path) => Err(ConfigError::Storage(format!(
            "{} requested but gate-runtime was built without the `rocksdb` feature",
            path.display()
        ))),
        None => Ok(Arc::new(InMemoryRecordStore::new())),
    }
}
