use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use sanitise::AbbreviationTable;

use crate::aggregates::{Mentions, MessageLog, SirRecords, TrendingTags};
use crate::error::StoreError;
use crate::files::{FileGateway, FileLayout};
use crate::store::AggregateState;

/// Durable representation of the aggregate state.
///
/// Implementations are loaded once at startup and then written after every
/// mutation. Absent data on first load is an empty collection, not an error.
pub trait PersistenceGateway: Send + Sync {
    /// Load every aggregate collection.
    fn load_all(&self) -> Result<AggregateState, StoreError>;
    /// Rewrite the SIR list in full.
    fn save_sir(&self, records: &SirRecords) -> Result<(), StoreError>;
    /// Rewrite the trending list in full.
    fn save_trending(&self, tags: &TrendingTags) -> Result<(), StoreError>;
    /// Rewrite the mentions list in full.
    fn save_mentions(&self, mentions: &Mentions) -> Result<(), StoreError>;
    /// Append one URL to the quarantine list.
    fn append_quarantine(&self, url: &str) -> Result<(), StoreError>;
    /// Rewrite the message log in full.
    fn save_messages(&self, log: &MessageLog) -> Result<(), StoreError>;
    /// Load the abbreviation table.
    fn load_abbreviations(&self) -> Result<AbbreviationTable, StoreError>;
}

/// Configuration for selecting and building a gateway.
///
/// # Example
/// ```
/// use store::GatewayConfig;
///
/// // In-memory (for testing)
/// let config = GatewayConfig::in_memory();
///
/// // Flat files under a data directory
/// let config = GatewayConfig::files("/var/lib/msgdesk");
/// ```
#[derive(Clone, Debug, Default)]
pub enum GatewayConfig {
    /// CSV and JSON files in `dir`, named by `layout`.
    Files { dir: PathBuf, layout: FileLayout },
    /// Nothing leaves the process. Useful for tests.
    #[default]
    InMemory,
}

impl GatewayConfig {
    pub fn in_memory() -> Self {
        GatewayConfig::InMemory
    }

    pub fn files<P: Into<PathBuf>>(dir: P) -> Self {
        GatewayConfig::Files {
            dir: dir.into(),
            layout: FileLayout::default(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn PersistenceGateway>, StoreError> {
        match self {
            GatewayConfig::InMemory => Ok(Box::new(InMemoryGateway::new())),
            GatewayConfig::Files { dir, layout } => {
                Ok(Box::new(FileGateway::open(dir, layout.clone())?))
            }
        }
    }
}

/// Gateway that keeps the last flushed state in memory.
///
/// Writes can be made to fail on demand, which is how flush-failure paths
/// are exercised without touching a filesystem.
pub struct InMemoryGateway {
    saved: RwLock<AggregateState>,
    abbreviations: AbbreviationTable,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::with_state(AggregateState::default(), AbbreviationTable::default())
    }

    /// Start from previously "persisted" state and a fixed abbreviation table.
    pub fn with_state(state: AggregateState, abbreviations: AbbreviationTable) -> Self {
        Self {
            saved: RwLock::new(state),
            abbreviations,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of everything written so far.
    pub fn saved(&self) -> AggregateState {
        self.saved
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn write<F>(&self, target: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut AggregateState),
    {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unwritable(target, "writes disabled"));
        }
        let mut guard = self
            .saved
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn load_all(&self) -> Result<AggregateState, StoreError> {
        Ok(self.saved())
    }

    fn save_sir(&self, records: &SirRecords) -> Result<(), StoreError> {
        self.write("sir", |state| state.sir = records.clone())
    }

    fn save_trending(&self, tags: &TrendingTags) -> Result<(), StoreError> {
        self.write("trending", |state| state.trending = tags.clone())
    }

    fn save_mentions(&self, mentions: &Mentions) -> Result<(), StoreError> {
        self.write("mentions", |state| state.mentions = mentions.clone())
    }

    fn append_quarantine(&self, url: &str) -> Result<(), StoreError> {
        self.write("quarantine", |state| state.quarantine.push(url))
    }

    fn save_messages(&self, log: &MessageLog) -> Result<(), StoreError> {
        self.write("messages", |state| state.messages = log.clone())
    }

    fn load_abbreviations(&self) -> Result<AbbreviationTable, StoreError> {
        Ok(self.abbreviations.clone())
    }
}
