//! The five aggregate collections the desk maintains.
//!
//! Each collection enforces its own uniqueness rule so the store can apply
//! side effects blindly:
//!
//! | Collection | Rule |
//! |------------|------|
//! | [`TrendingTags`] | case-insensitive key, count incremented per occurrence |
//! | [`Mentions`] | first-seen order, duplicates ignored |
//! | [`SirRecords`] | sort code unique, first write wins |
//! | [`QuarantinedUrls`] | append-only, duplicates kept |
//! | [`MessageLog`] | arrival order, structurally equal messages dropped |
use std::collections::{HashMap, HashSet};

use sanitise::SanitisedMessage;

/// Hashtag occurrence counts.
///
/// Keys are stored without the leading `#` and compared case-insensitively;
/// the spelling seen first is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendingTags {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl TrendingTags {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tag: &str) -> Option<&str> {
        let tag = tag.strip_prefix('#').unwrap_or(tag);
        if tag.is_empty() {
            None
        } else {
            Some(tag)
        }
    }

    /// Count one occurrence of `tag` (with or without `#`). Returns false if
    /// the tag was empty.
    pub fn observe(&mut self, tag: &str) -> bool {
        self.add(tag, 1)
    }

    /// Add `count` occurrences, inserting the tag if unseen.
    pub fn add(&mut self, tag: &str, count: u32) -> bool {
        let Some(tag) = Self::key(tag) else {
            return false;
        };
        if count == 0 {
            return false;
        }
        let folded = tag.to_lowercase();
        match self.index.get(&folded) {
            Some(&pos) => {
                let entry = &mut self.entries[pos].1;
                *entry = entry.saturating_add(count);
            }
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((tag.to_string(), count));
            }
        }
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        Self::key(tag).is_some_and(|tag| self.index.contains_key(&tag.to_lowercase()))
    }

    pub fn count(&self, tag: &str) -> u32 {
        Self::key(tag)
            .and_then(|tag| self.index.get(&tag.to_lowercase()))
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    /// Entries by count descending; ties stay in first-seen order.
    pub fn ranked(&self) -> Vec<(String, u32)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Twitter handles mentioned in tweets, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mentions {
    handles: Vec<String>,
    seen: HashSet<String>,
}

impl Mentions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the handle was new.
    pub fn insert(&mut self, handle: &str) -> bool {
        if handle.is_empty() || self.seen.contains(handle) {
            return false;
        }
        self.seen.insert(handle.to_string());
        self.handles.push(handle.to_string());
        true
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.seen.contains(handle)
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Sort code to nature of incident, from SIR emails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SirRecords {
    records: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl SirRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incident unless the sort code is already known.
    pub fn insert(&mut self, sort_code: &str, nature_of_incident: &str) -> bool {
        if self.index.contains_key(sort_code) {
            return false;
        }
        self.index.insert(sort_code.to_string(), self.records.len());
        self.records
            .push((sort_code.to_string(), nature_of_incident.to_string()));
        true
    }

    pub fn get(&self, sort_code: &str) -> Option<&str> {
        self.index
            .get(sort_code)
            .map(|&pos| self.records[pos].1.as_str())
    }

    pub fn records(&self) -> &[(String, String)] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// URLs removed from email bodies, one entry per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarantinedUrls {
    urls: Vec<String>,
}

impl QuarantinedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: &str) {
        self.urls.push(url.to_string());
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Sanitised messages in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<SanitisedMessage>,
    seen: HashSet<SanitisedMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless a structurally equal message is already logged.
    pub fn append(&mut self, message: SanitisedMessage) -> bool {
        if self.seen.contains(&message) {
            return false;
        }
        self.seen.insert(message.clone());
        self.messages.push(message);
        true
    }

    pub fn contains(&self, message: &SanitisedMessage) -> bool {
        self.seen.contains(message)
    }

    pub fn messages(&self) -> &[SanitisedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl FromIterator<SanitisedMessage> for MessageLog {
    fn from_iter<I: IntoIterator<Item = SanitisedMessage>>(iter: I) -> Self {
        let mut log = MessageLog::new();
        for message in iter {
            log.append(message);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trending_keys_fold_case_and_hash() {
        let mut tags = TrendingTags::new();
        assert!(tags.observe("#deals"));
        assert!(tags.observe("#Deals"));
        assert!(tags.observe("DEALS"));
        assert_eq!(tags.count("deals"), 3);
        assert_eq!(tags.count("#DEALS"), 3);
        assert_eq!(tags.entries(), &[("deals".to_string(), 3)]);
    }

    #[test]
    fn trending_contains_ignores_case_and_hash() {
        let mut tags = TrendingTags::new();
        tags.observe("Deals");
        assert!(tags.contains("#DEALS"));
        assert!(!tags.contains("rust"));
        assert!(!tags.contains("#"));
    }

    #[test]
    fn trending_rejects_bare_hash() {
        let mut tags = TrendingTags::new();
        assert!(!tags.observe("#"));
        assert!(tags.is_empty());
    }

    #[test]
    fn ranked_is_stable_on_ties() {
        let mut tags = TrendingTags::new();
        tags.add("a", 3);
        tags.add("b", 5);
        tags.add("c", 3);
        assert_eq!(
            tags.ranked(),
            vec![("b".to_string(), 5), ("a".to_string(), 3), ("c".to_string(), 3)]
        );
    }

    #[test]
    fn mentions_keep_first_seen_order() {
        let mut mentions = Mentions::new();
        assert!(mentions.insert("@b"));
        assert!(mentions.insert("@a"));
        assert!(!mentions.insert("@b"));
        assert_eq!(mentions.handles(), &["@b".to_string(), "@a".to_string()]);
    }

    #[test]
    fn sir_first_write_wins() {
        let mut sir = SirRecords::new();
        assert!(sir.insert("SC001", "Theft"));
        assert!(!sir.insert("SC001", "Raid"));
        assert_eq!(sir.get("SC001"), Some("Theft"));
        assert_eq!(sir.len(), 1);
    }

    #[test]
    fn quarantine_keeps_duplicates() {
        let mut urls = QuarantinedUrls::new();
        urls.push("https://example.com");
        urls.push("https://example.com");
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn message_log_drops_structural_duplicates() {
        let msg = SanitisedMessage {
            header: "S000000001".into(),
            sender: "+447911123456".into(),
            subject: None,
            body: "hi".into(),
        };
        let mut log = MessageLog::new();
        assert!(log.append(msg.clone()));
        assert!(!log.append(msg.clone()));

        let mut other = msg;
        other.body = "hi again".into();
        assert!(log.append(other));
        assert_eq!(log.len(), 2);
    }
}
