use sanitise::{Sanitised, SanitisedMessage, SideEffect};
use tracing::debug;

use crate::aggregates::{Mentions, MessageLog, QuarantinedUrls, SirRecords, TrendingTags};

/// Every aggregate collection, as loaded at startup or held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    pub trending: TrendingTags,
    pub mentions: Mentions,
    pub sir: SirRecords,
    pub quarantine: QuarantinedUrls,
    pub messages: MessageLog,
}

/// Which collections a commit touched, and therefore which files need
/// flushing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub trending: bool,
    pub mentions: bool,
    pub sir: bool,
    /// URLs appended to the quarantine list, in order.
    pub quarantined: Vec<String>,
    pub message_appended: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        !self.trending
            && !self.mentions
            && !self.sir
            && self.quarantined.is_empty()
            && !self.message_appended
    }

    /// Fold `other` into `self`, e.g. to accumulate unflushed work.
    pub fn merge(&mut self, other: Changes) {
        self.trending |= other.trending;
        self.mentions |= other.mentions;
        self.sir |= other.sir;
        self.quarantined.extend(other.quarantined);
        self.message_appended |= other.message_appended;
    }
}

/// Single owner of all aggregate state.
///
/// The store is plain data: it has no interior locking and does no I/O.
/// Callers that share it across threads wrap it in one mutex, and flush the
/// collections named in the returned [`Changes`].
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    state: AggregateState,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: AggregateState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Apply side effects from one sanitised message.
    pub fn apply(&mut self, effects: &[SideEffect]) -> Changes {
        let mut changes = Changes::default();
        for effect in effects {
            match effect {
                SideEffect::QuarantineUrl(url) => {
                    self.state.quarantine.push(url);
                    changes.quarantined.push(url.clone());
                }
                SideEffect::RecordSir {
                    sort_code,
                    nature_of_incident,
                } => {
                    if self.state.sir.insert(sort_code, nature_of_incident) {
                        changes.sir = true;
                    } else {
                        debug!(sort_code = %sort_code, "sir_duplicate_ignored");
                    }
                }
                SideEffect::ObserveTag(tag) => {
                    changes.trending |= self.state.trending.observe(tag);
                }
                SideEffect::ObserveMention(handle) => {
                    changes.mentions |= self.state.mentions.insert(handle);
                }
            }
        }
        changes
    }

    /// Append to the message log. Returns false for a duplicate.
    pub fn append_message(&mut self, message: SanitisedMessage) -> bool {
        let appended = self.state.messages.append(message);
        if !appended {
            debug!("duplicate_message_ignored");
        }
        appended
    }

    /// Apply a sanitised message's effects and append the message itself.
    pub fn commit(&mut self, sanitised: &Sanitised) -> Changes {
        let mut changes = self.apply(&sanitised.effects);
        changes.message_appended = self.append_message(sanitised.message.clone());
        changes
    }

    /// Tags by count descending, ties in first-seen order.
    pub fn snapshot_trending(&self) -> Vec<(String, u32)> {
        self.state.trending.ranked()
    }

    pub fn snapshot_mentions(&self) -> Vec<String> {
        self.state.mentions.handles().to_vec()
    }

    pub fn snapshot_sir(&self) -> Vec<(String, String)> {
        self.state.sir.records().to_vec()
    }

    pub fn snapshot_quarantine(&self) -> Vec<String> {
        self.state.quarantine.urls().to_vec()
    }

    pub fn snapshot_messages(&self) -> Vec<SanitisedMessage> {
        self.state.messages.messages().to_vec()
    }
}
