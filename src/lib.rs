//! Workspace umbrella crate for the message intake desk.
//!
//! This crate stitches validation, sanitisation and the aggregate store
//! together behind one [`Desk`], so callers submit a raw header and body and
//! get back either a typed rejection or the stored message.
//!
//! ```
//! use std::sync::Arc;
//! use msgdesk::{Desk, DeskOptions, InMemoryGateway};
//!
//! let desk = Desk::with_gateway(Arc::new(InMemoryGateway::new()), DeskOptions::default()).unwrap();
//! desk.submit("T999999999", "@desk\nGreat #deals today").unwrap();
//! assert_eq!(desk.snapshot_trending(), vec![("deals".to_string(), 1)]);
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, DeskConfig, FlushYamlConfig, StorageBackend, StorageYamlConfig};
pub use ingest::{
    classify_and_validate, classify_and_validate_with_config, ConfigError, IncidentCatalog,
    IncidentReport, MessageBody, MessageHeader, MessageKind, ParsedMessage, ValidationConfig,
    ValidationError,
};
pub use sanitise::{sanitise, AbbreviationTable, Sanitised, SanitisedMessage, SideEffect, URL_QUARANTINED};
pub use store::{
    AggregateState, AggregateStore, Changes, FileGateway, FileLayout, GatewayConfig,
    InMemoryGateway, PersistenceGateway, StoreError,
};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Level};

/// Default number of attempts per file write before a flush gives up.
pub const DEFAULT_FLUSH_ATTEMPTS: u32 = 3;

/// Outcome of one accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// The message as stored.
    pub message: SanitisedMessage,
    /// Aggregate updates the message produced, in application order.
    pub effects: Vec<SideEffect>,
    /// False when a structurally equal message was already logged.
    pub appended: bool,
}

/// Errors that can occur while opening a desk or submitting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The message was rejected before any state changed.
    Validation(ValidationError),
    /// Loading persisted state failed at startup.
    Store(StoreError),
    /// Validation limits are unusable.
    Config(ConfigError),
    /// In-memory state changed but some files could not be written.
    ///
    /// `submission` is present when the failure happened while submitting;
    /// [`Desk::retry_pending`] reports failures without one.
    PartiallyCommitted {
        submission: Option<Box<Submission>>,
        errors: Vec<StoreError>,
    },
}

impl PipelineError {
    /// True when the caller should retry persistence rather than resubmit.
    pub fn is_partial_commit(&self) -> bool {
        matches!(self, PipelineError::PartiallyCommitted { .. })
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Validation(err) => write!(f, "{err}"),
            PipelineError::Store(err) => write!(f, "storage failure: {err}"),
            PipelineError::Config(err) => write!(f, "invalid configuration: {err}"),
            PipelineError::PartiallyCommitted { errors, .. } => {
                write!(f, "submission partially failed: {} write(s) pending", errors.len())?;
                if let Some(first) = errors.first() {
                    write!(f, " ({first})")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Validation(err) => Some(err),
            PipelineError::Store(err) => Some(err),
            PipelineError::Config(err) => Some(err),
            PipelineError::PartiallyCommitted { errors, .. } => {
                errors.first().map(|err| err as &(dyn Error + 'static))
            }
        }
    }
}

impl From<ValidationError> for PipelineError {
    fn from(value: ValidationError) -> Self {
        PipelineError::Validation(value)
    }
}

impl From<StoreError> for PipelineError {
    fn from(value: StoreError) -> Self {
        PipelineError::Store(value)
    }
}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        PipelineError::Config(value)
    }
}

/// Metrics observer for desk stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_validate(&self, latency: Duration, result: Result<(), ValidationError>);
    fn record_sanitise(&self, latency: Duration, effects: usize);
    fn record_commit(&self, latency: Duration, result: Result<(), PipelineError>);
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start(recorder: Option<&Arc<dyn PipelineMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: Arc::clone(recorder),
            start: Instant::now(),
        })
    }

    fn record_validate(self, result: Result<(), ValidationError>) {
        self.recorder.record_validate(self.start.elapsed(), result);
    }

    fn record_sanitise(self, effects: usize) {
        self.recorder.record_sanitise(self.start.elapsed(), effects);
    }

    fn record_commit(self, result: Result<(), PipelineError>) {
        self.recorder.record_commit(self.start.elapsed(), result);
    }
}

/// Knobs for a desk built around an existing gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskOptions {
    pub validation: ValidationConfig,
    /// Attempts per file write, at least 1.
    pub flush_attempts: u32,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            flush_attempts: DEFAULT_FLUSH_ATTEMPTS,
        }
    }
}

struct DeskState {
    store: AggregateStore,
    /// Writes not yet confirmed by the gateway.
    pending: Changes,
}

/// The intake desk: validate, sanitise, apply, flush.
///
/// All aggregate state sits behind one mutex. Flushes run while it is held,
/// so two writes to the same file never overlap.
pub struct Desk {
    gateway: Arc<dyn PersistenceGateway>,
    abbreviations: AbbreviationTable,
    validation: ValidationConfig,
    flush_attempts: u32,
    metrics: Option<Arc<dyn PipelineMetrics>>,
    state: Mutex<DeskState>,
}

impl fmt::Debug for Desk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Desk")
            .field("abbreviations", &self.abbreviations.len())
            .field("validation", &self.validation)
            .field("flush_attempts", &self.flush_attempts)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl Desk {
    /// Build the configured gateway and load everything it holds.
    pub fn open(config: &DeskConfig) -> Result<Self, PipelineError> {
        let gateway = config.gateway_config().build()?;
        Self::with_gateway(Arc::from(gateway), config.desk_options())
    }

    /// Load abbreviations and aggregate state from `gateway`.
    pub fn with_gateway(
        gateway: Arc<dyn PersistenceGateway>,
        options: DeskOptions,
    ) -> Result<Self, PipelineError> {
        options.validation.validate()?;
        let abbreviations = gateway.load_abbreviations()?;
        let state = gateway.load_all()?;

        info!(
            abbreviations = abbreviations.len(),
            messages = state.messages.len(),
            trending = state.trending.len(),
            mentions = state.mentions.len(),
            sir = state.sir.len(),
            quarantined = state.quarantine.len(),
            "desk_opened"
        );

        Ok(Self {
            gateway,
            abbreviations,
            validation: options.validation,
            flush_attempts: options.flush_attempts.max(1),
            metrics: None,
            state: Mutex::new(DeskState {
                store: AggregateStore::from_state(state),
                pending: Changes::default(),
            }),
        })
    }

    /// Attach a metrics observer to this desk.
    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn abbreviations(&self) -> &AbbreviationTable {
        &self.abbreviations
    }

    /// Validate, sanitise and store one raw message.
    ///
    /// Rejections leave every collection untouched. Once validation passes
    /// the in-memory state always changes; if some files cannot be written
    /// the call returns [`PipelineError::PartiallyCommitted`] and the writes
    /// stay pending until the next submit or [`Desk::retry_pending`].
    pub fn submit(&self, header: &str, body: &str) -> Result<Submission, PipelineError> {
        let validate_metrics = MetricsSpan::start(self.metrics.as_ref());
        let parsed = match classify_and_validate_with_config(header, body, &self.validation) {
            Ok(parsed) => {
                if let Some(span) = validate_metrics {
                    span.record_validate(Ok(()));
                }
                parsed
            }
            Err(err) => {
                if let Some(span) = validate_metrics {
                    span.record_validate(Err(err.clone()));
                }
                return Err(PipelineError::Validation(err));
            }
        };

        let sanitise_metrics = MetricsSpan::start(self.metrics.as_ref());
        let sanitised = sanitise(parsed, &self.abbreviations);
        if let Some(span) = sanitise_metrics {
            span.record_sanitise(sanitised.effects.len());
        }

        let span = tracing::span!(
            Level::INFO,
            "desk.commit",
            header = %sanitised.message.header,
            effects = sanitised.effects.len()
        );
        let _guard = span.enter();

        let commit_metrics = MetricsSpan::start(self.metrics.as_ref());
        let start = Instant::now();
        let mut state = self.lock();
        let changes = state.store.commit(&sanitised);
        let appended = changes.message_appended;
        // The message log is rewritten on every submission.
        state.pending.merge(Changes {
            message_appended: true,
            ..changes
        });
        let errors = self.flush(&mut state);
        drop(state);

        let submission = Submission {
            message: sanitised.message,
            effects: sanitised.effects,
            appended,
        };
        let elapsed_micros = start.elapsed().as_micros();

        let result = if errors.is_empty() {
            info!(appended, elapsed_micros, "submit_success");
            Ok(submission)
        } else {
            warn!(
                appended,
                failed_writes = errors.len(),
                elapsed_micros,
                "submit_partially_committed"
            );
            Err(PipelineError::PartiallyCommitted {
                submission: Some(Box::new(submission)),
                errors,
            })
        };

        if let Some(span) = commit_metrics {
            span.record_commit(result.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        result
    }

    /// Re-attempt writes left over from earlier partial commits.
    pub fn retry_pending(&self) -> Result<(), PipelineError> {
        let mut state = self.lock();
        if state.pending.is_empty() {
            return Ok(());
        }
        let errors = self.flush(&mut state);
        if errors.is_empty() {
            info!("pending_writes_flushed");
            Ok(())
        } else {
            Err(PipelineError::PartiallyCommitted {
                submission: None,
                errors,
            })
        }
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    /// Tags by count descending, ties in first-seen order.
    pub fn snapshot_trending(&self) -> Vec<(String, u32)> {
        self.lock().store.snapshot_trending()
    }

    pub fn snapshot_mentions(&self) -> Vec<String> {
        self.lock().store.snapshot_mentions()
    }

    pub fn snapshot_sir(&self) -> Vec<(String, String)> {
        self.lock().store.snapshot_sir()
    }

    pub fn snapshot_quarantine(&self) -> Vec<String> {
        self.lock().store.snapshot_quarantine()
    }

    pub fn snapshot_messages(&self) -> Vec<SanitisedMessage> {
        self.lock().store.snapshot_messages()
    }

    fn lock(&self) -> MutexGuard<'_, DeskState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write every pending collection. Successful writes are cleared from
    /// `pending`; the errors of the rest are returned.
    fn flush(&self, state: &mut DeskState) -> Vec<StoreError> {
        let DeskState { store, pending } = state;
        let aggregates = store.state();
        let mut errors = Vec::new();

        if pending.sir {
            match self.write_with_retries("sir", || self.gateway.save_sir(&aggregates.sir)) {
                Ok(()) => pending.sir = false,
                Err(err) => errors.push(err),
            }
        }
        if pending.trending {
            match self.write_with_retries("trending", || {
                self.gateway.save_trending(&aggregates.trending)
            }) {
                Ok(()) => pending.trending = false,
                Err(err) => errors.push(err),
            }
        }
        if pending.mentions {
            match self.write_with_retries("mentions", || {
                self.gateway.save_mentions(&aggregates.mentions)
            }) {
                Ok(()) => pending.mentions = false,
                Err(err) => errors.push(err),
            }
        }

        // Appends keep their order: stop at the first URL that will not go.
        let mut appended = 0;
        for url in &pending.quarantined {
            match self.write_with_retries("quarantine", || self.gateway.append_quarantine(url)) {
                Ok(()) => appended += 1,
                Err(err) => {
                    errors.push(err);
                    break;
                }
            }
        }
        pending.quarantined.drain(..appended);

        if pending.message_appended {
            match self.write_with_retries("messages", || {
                self.gateway.save_messages(&aggregates.messages)
            }) {
                Ok(()) => pending.message_appended = false,
                Err(err) => errors.push(err),
            }
        }

        errors
    }

    fn write_with_retries<F>(&self, collection: &'static str, mut write: F) -> Result<(), StoreError>
    where
        F: FnMut() -> Result<(), StoreError>,
    {
        let mut attempt = 1;
        loop {
            match write() {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.flush_attempts => {
                    debug!(collection, attempt, error = %err, "flush_retry");
                    attempt += 1;
                }
                Err(err) => {
                    warn!(collection, attempts = attempt, error = %err, "flush_failure");
                    return Err(err);
                }
            }
        }
    }
}
