//! # Gate Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! ## Security Requirements
//!
//! - `signing_secret` MUST NOT be the default zero value in production
//! - All timeouts and limits have sane defaults with override capability

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use gate_telemetry::TelemetryConfig;
use shared_types::{ContractRef, ScopeId};
use tg_01_qr_codes::{FreshnessConfig, SecretError, SigningKeyring, SigningSecret};
use tg_03_verification::{OwnershipCheckMode, ScopeDirectory, VerificationPolicy};
use tg_04_scan_session::SessionConfig;
use thiserror::Error;
use zeroize::Zeroizing;

/// Complete gate configuration.
#[derive(Debug, Clone, Default)]
pub struct GateConfig {
    /// Signing secrets.
    pub security: SecurityConfig,
    /// Maximum code ages.
    pub freshness: FreshnessConfig,
    /// Ownership cross-check.
    pub verification: VerificationConfig,
    /// Door scan sessions.
    pub session: SessionSettings,
    /// Ledger backing store.
    pub storage: StorageConfig,
    /// Logs and metrics.
    pub telemetry: TelemetryConfig,
}

impl GateConfig {
    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the signing secret or any scope secret is all zeros
    /// - fail-closed ownership checks are on but no scope has a contract
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if is_zero(&self.security.signing_secret)
            || self
                .security
                .scope_secrets
                .iter()
                .any(|(_, secret)| is_zero(secret))
        {
            return Err(ConfigError::InsecureSigningSecret);
        }
        if self.verification.ownership_mode == OwnershipCheckMode::Required
            && self.verification.scope_contracts.is_empty()
        {
            return Err(ConfigError::InvalidValue {
                var: "TG_SCOPE_CONTRACTS",
                reason: "required ownership checks need at least one scope contract".into(),
            });
        }
        Ok(())
    }

    /// Pipeline tunables for the verification service.
    pub fn verification_policy(&self) -> VerificationPolicy {
        VerificationPolicy {
            freshness: self.freshness,
            ownership_mode: self.verification.ownership_mode,
            oracle_timeout: self.verification.oracle_timeout,
        }
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Signing secret is not set (zero value).
    #[error(
        "SECURITY VIOLATION: signing secret is the default zero value. \
         Set TG_SIGNING_SECRET environment variable."
    )]
    InsecureSigningSecret,

    /// A variable is present but unusable.
    #[error("{var}: {reason}")]
    InvalidValue {
        /// Offending variable.
        var: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A secret was rejected by the signer.
    #[error("{var}: {source}")]
    Secret {
        /// Offending variable.
        var: &'static str,
        /// Signer's complaint.
        #[source]
        source: SecretError,
    },

    /// The ledger store could not be opened.
    #[error("ledger storage: {0}")]
    Storage(String),
}

/// Security configuration.
#[derive(Clone)]
pub struct SecurityConfig {
    /// Default HMAC secret (at least 32 bytes).
    /// MUST NOT be default in production.
    pub signing_secret: Zeroizing<Vec<u8>>,
    /// Per-event secrets overriding the default.
    pub scope_secrets: Vec<(ScopeId, Zeroizing<Vec<u8>>)>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            signing_secret: Zeroizing::new(vec![0u8; 32]), // MUST be overridden in production
            scope_secrets: Vec::new(),
        }
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("signing_secret", &"<redacted>")
            .field(
                "scope_secrets",
                &self.scope_secrets.iter().map(|(s, _)| s).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SecurityConfig {
    /// Build the keyring shared by issuer and verifier.
    pub fn keyring(&self) -> Result<SigningKeyring, ConfigError> {
        let default = SigningSecret::new(self.signing_secret.to_vec()).map_err(|source| {
            ConfigError::Secret {
                var: "TG_SIGNING_SECRET",
                source,
            }
        })?;
        self.scope_secrets
            .iter()
            .try_fold(SigningKeyring::new(default), |keyring, (scope, bytes)| {
                let secret =
                    SigningSecret::new(bytes.to_vec()).map_err(|source| ConfigError::Secret {
                        var: "TG_SCOPE_SECRETS",
                        source,
                    })?;
                Ok(keyring.with_scope_secret(scope.clone(), secret))
            })
    }
}

/// Ownership cross-check configuration.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Whether and how strictly the chain is consulted.
    pub ownership_mode: OwnershipCheckMode,
    /// Upper bound on each oracle call.
    pub oracle_timeout: Duration,
    /// Ticket contract backing each event.
    pub scope_contracts: Vec<(ScopeId, ContractRef)>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            ownership_mode: OwnershipCheckMode::Disabled,
            oracle_timeout: Duration::from_millis(1_500),
            scope_contracts: Vec::new(),
        }
    }
}

impl VerificationConfig {
    /// Scope-to-contract lookup for the oracle.
    pub fn directory(&self) -> ScopeDirectory {
        self.scope_contracts.iter().cloned().collect()
    }
}

/// Door scan session configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Cool-downs and buffering.
    pub scan: SessionConfig,
    /// Operator account that owns sessions opened by this process.
    pub operator: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scan: SessionConfig::default(),
            operator: "door-staff".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// On-disk ledger directory. In-memory when unset.
    pub ledger_path: Option<PathBuf>,
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<GateConfig, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration, reading variables through `lookup`.
///
/// | Variable | Format |
/// |----------|--------|
/// | `TG_SIGNING_SECRET` | hex, at least 32 bytes |
/// | `TG_SCOPE_SECRETS` | `scope=hex,scope=hex` |
/// | `TG_ROTATING_MAX_AGE_SECS` | seconds |
/// | `TG_STATIC_MAX_AGE_SECS` | seconds |
/// | `TG_OWNERSHIP_CHECK` | `disabled`, `advisory` or `required` |
/// | `TG_ORACLE_TIMEOUT_MS` | milliseconds |
/// | `TG_SCOPE_CONTRACTS` | `scope=0xaddr,scope=0xaddr` |
/// | `TG_COOLDOWN_MS` | milliseconds |
/// | `TG_TRANSIENT_COOLDOWN_MS` | milliseconds |
/// | `TG_OPERATOR` | operator account |
/// | `TG_LEDGER_PATH` | directory |
pub fn load_config_from<F>(lookup: F) -> Result<GateConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GateConfig {
        telemetry: TelemetryConfig::from_lookup(&lookup),
        ..GateConfig::default()
    };

    if let Some(secret_hex) = lookup("TG_SIGNING_SECRET") {
        config.security.signing_secret = decode_secret("TG_SIGNING_SECRET", &secret_hex)?;
    }
    if let Some(pairs) = lookup("TG_SCOPE_SECRETS") {
        for (scope, secret_hex) in parse_pairs("TG_SCOPE_SECRETS", &pairs)? {
            let secret = decode_secret("TG_SCOPE_SECRETS", secret_hex)?;
            config
                .security
                .scope_secrets
                .push((parse_scope("TG_SCOPE_SECRETS", scope)?, secret));
        }
    }

    let rotating = parse_number(&lookup, "TG_ROTATING_MAX_AGE_SECS")?
        .unwrap_or(config.freshness.rotating.max_age_secs);
    let legacy = parse_number(&lookup, "TG_STATIC_MAX_AGE_SECS")?
        .unwrap_or(config.freshness.legacy.max_age_secs);
    config.freshness = FreshnessConfig::with_max_ages(rotating, legacy);

    if let Some(mode) = lookup("TG_OWNERSHIP_CHECK") {
        config.verification.ownership_mode =
            mode.parse().map_err(|e| ConfigError::InvalidValue {
                var: "TG_OWNERSHIP_CHECK",
                reason: format!("{e}"),
            })?;
    }
    if let Some(ms) = parse_number(&lookup, "TG_ORACLE_TIMEOUT_MS")? {
        config.verification.oracle_timeout = Duration::from_millis(ms);
    }
    if let Some(pairs) = lookup("TG_SCOPE_CONTRACTS") {
        for (scope, contract) in parse_pairs("TG_SCOPE_CONTRACTS", &pairs)? {
            config.verification.scope_contracts.push((
                parse_scope("TG_SCOPE_CONTRACTS", scope)?,
                ContractRef(contract.to_string()),
            ));
        }
    }

    if let Some(ms) = parse_number(&lookup, "TG_COOLDOWN_MS")? {
        config.session.scan.cooldown = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_number(&lookup, "TG_TRANSIENT_COOLDOWN_MS")? {
        config.session.scan.transient_cooldown = Duration::from_millis(ms);
    }
    if let Some(operator) = lookup("TG_OPERATOR") {
        config.session.operator = operator;
    }

    config.storage.ledger_path = lookup("TG_LEDGER_PATH").map(PathBuf::from);

    Ok(config)
}

fn decode_secret(var: &'static str, text: &str) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = Zeroizing::new(
        hex::decode(digits).map_err(|e| ConfigError::Secret {
            var,
            source: SecretError::InvalidHex(e.to_string()),
        })?,
    );
    if bytes.len() < SigningSecret::MIN_LEN {
        return Err(ConfigError::Secret {
            var,
            source: SecretError::TooShort {
                len: bytes.len(),
                min: SigningSecret::MIN_LEN,
            },
        });
    }
    Ok(bytes)
}

fn parse_number<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                var,
                reason: format!("`{raw}`: {e}"),
            })
        })
        .transpose()
}

fn parse_pairs<'a>(var: &'static str, text: &'a str) -> Result<Vec<(&'a str, &'a str)>, ConfigError> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    var,
                    reason: format!("expected `scope=value`, got `{entry}`"),
                })
        })
        .collect()
}

fn parse_scope(var: &'static str, text: &str) -> Result<ScopeId, ConfigError> {
    ScopeId::new(text).map_err(|e| ConfigError::InvalidValue {
        var,
        reason: e.to_string(),
    })
}
