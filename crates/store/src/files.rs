//! Flat-file gateway.
//!
//! File formats, all UTF-8 with one record per line and no header row:
//!
//! ```text
//! SIRList.csv             sortcode,natureOfIncident      rewritten in full
//! Hashtags.csv            #tag,count                     rewritten in full
//! MentionsList.csv        @handle                        rewritten in full
//! URLQuarantineList.csv   url                            appended
//! StoredMessages.json     pretty-printed JSON array      rewritten in full
//! textwords.csv           TOKEN,expansion text           read only
//! ```
//!
//! A missing file loads as an empty collection. An unreadable or malformed
//! CSV list is a startup fault; an unreadable or malformed message log is
//! logged and treated as empty.
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sanitise::{AbbreviationTable, SanitisedMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregates::{Mentions, MessageLog, QuarantinedUrls, SirRecords, TrendingTags};
use crate::error::StoreError;
use crate::gateway::PersistenceGateway;
use crate::store::AggregateState;

/// File names used inside the data directory.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileLayout {
    pub sir: String,
    pub trending: String,
    pub mentions: String,
    pub quarantine: String,
    pub messages: String,
    pub abbreviations: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            sir: "SIRList.csv".into(),
            trending: "Hashtags.csv".into(),
            mentions: "MentionsList.csv".into(),
            quarantine: "URLQuarantineList.csv".into(),
            messages: "StoredMessages.json".into(),
            abbreviations: "textwords.csv".into(),
        }
    }
}

/// Gateway over a directory of CSV and JSON files.
#[derive(Debug, Clone)]
pub struct FileGateway {
    dir: PathBuf,
    layout: FileLayout,
}

impl FileGateway {
    /// Use `dir` as the data directory, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P, layout: FileLayout) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::unwritable(dir.display().to_string(), e))?;
        Ok(Self { dir, layout })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Contents of `name`, or `None` if it does not exist yet.
    fn read_optional(&self, name: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(file = name, "file_missing_loaded_empty");
                Ok(None)
            }
            Err(err) => Err(StoreError::unreadable(name, err)),
        }
    }

    fn write_lines<I, S>(&self, name: &str, lines: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line.as_ref());
            contents.push('\n');
        }
        fs::write(self.path(name), contents).map_err(|e| StoreError::unwritable(name, e))
    }

    fn load_sir(&self) -> Result<SirRecords, StoreError> {
        let name = self.layout.sir.as_str();
        let mut records = SirRecords::new();
        for (line_no, line) in non_empty_lines(self.read_optional(name)?.as_deref()) {
            let (code, nature) = split_record(name, line_no, line)?;
            records.insert(code, nature);
        }
        Ok(records)
    }

    fn load_trending(&self) -> Result<TrendingTags, StoreError> {
        let name = self.layout.trending.as_str();
        let mut tags = TrendingTags::new();
        for (line_no, line) in non_empty_lines(self.read_optional(name)?.as_deref()) {
            let (tag, count) = split_record(name, line_no, line)?;
            let count: u32 = count.trim().parse().map_err(|_| StoreError::MalformedRecord {
                file: name.to_string(),
                line: line_no,
                reason: format!("count {count:?} is not a positive integer"),
            })?;
            if tags.contains(tag) {
                debug!(file = name, line = line_no, tag, "duplicate_tag_row_ignored");
                continue;
            }
            tags.add(tag, count);
        }
        Ok(tags)
    }

    fn load_mentions(&self) -> Result<Mentions, StoreError> {
        let mut mentions = Mentions::new();
        for (_, line) in non_empty_lines(self.read_optional(&self.layout.mentions)?.as_deref()) {
            mentions.insert(line.trim());
        }
        Ok(mentions)
    }

    fn load_quarantine(&self) -> Result<QuarantinedUrls, StoreError> {
        let mut urls = QuarantinedUrls::new();
        for (_, line) in non_empty_lines(self.read_optional(&self.layout.quarantine)?.as_deref()) {
            urls.push(line.trim());
        }
        Ok(urls)
    }

    /// Message log, falling back to empty on any read or parse failure.
    fn load_messages(&self) -> MessageLog {
        let name = self.layout.messages.as_str();
        let contents = match self.read_optional(name) {
            Ok(Some(contents)) => contents,
            Ok(None) => return MessageLog::new(),
            Err(err) => {
                warn!(error = %err, "message_log_unreadable_loaded_empty");
                return MessageLog::new();
            }
        };
        if contents.trim().is_empty() {
            return MessageLog::new();
        }
        match serde_json::from_str::<Vec<SanitisedMessage>>(&contents) {
            Ok(messages) => messages.into_iter().collect(),
            Err(err) => {
                let err = StoreError::MalformedJson {
                    file: name.to_string(),
                    reason: err.to_string(),
                };
                warn!(error = %err, "message_log_malformed_loaded_empty");
                MessageLog::new()
            }
        }
    }
}

fn non_empty_lines(contents: Option<&str>) -> impl Iterator<Item = (usize, &str)> {
    contents
        .unwrap_or_default()
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn split_record<'a>(
    file: &str,
    line_no: usize,
    line: &'a str,
) -> Result<(&'a str, &'a str), StoreError> {
    line.split_once(',').ok_or_else(|| StoreError::MalformedRecord {
        file: file.to_string(),
        line: line_no,
        reason: "expected two comma-separated fields".into(),
    })
}

/// Commas are the only delimiter, so they cannot survive inside a field.
fn csv_field(value: &str) -> String {
    if value.contains(',') {
        warn!(value, "comma_replaced_in_csv_field");
        value.replace(',', " ")
    } else {
        value.to_string()
    }
}

impl PersistenceGateway for FileGateway {
    fn load_all(&self) -> Result<AggregateState, StoreError> {
        let state = AggregateState {
            trending: self.load_trending()?,
            mentions: self.load_mentions()?,
            sir: self.load_sir()?,
            quarantine: self.load_quarantine()?,
            messages: self.load_messages(),
        };
        info!(
            dir = %self.dir.display(),
            trending = state.trending.len(),
            mentions = state.mentions.len(),
            sir = state.sir.len(),
            quarantine = state.quarantine.len(),
            messages = state.messages.len(),
            "aggregates_loaded"
        );
        Ok(state)
    }

    fn save_sir(&self, records: &SirRecords) -> Result<(), StoreError> {
        self.write_lines(
            &self.layout.sir,
            records
                .records()
                .iter()
                .map(|(code, nature)| format!("{},{}", csv_field(code), csv_field(nature))),
        )
    }

    fn save_trending(&self, tags: &TrendingTags) -> Result<(), StoreError> {
        self.write_lines(
            &self.layout.trending,
            tags.entries()
                .iter()
                .map(|(tag, count)| format!("#{},{count}", csv_field(tag))),
        )
    }

    fn save_mentions(&self, mentions: &Mentions) -> Result<(), StoreError> {
        self.write_lines(&self.layout.mentions, mentions.handles())
    }

    fn append_quarantine(&self, url: &str) -> Result<(), StoreError> {
        let name = self.layout.quarantine.as_str();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))
            .map_err(|e| StoreError::unwritable(name, e))?;
        writeln!(file, "{url}").map_err(|e| StoreError::unwritable(name, e))
    }

    fn save_messages(&self, log: &MessageLog) -> Result<(), StoreError> {
        let name = self.layout.messages.as_str();
        let json = serde_json::to_string_pretty(log.messages())
            .map_err(|e| StoreError::unwritable(name, e))?;
        fs::write(self.path(name), json).map_err(|e| StoreError::unwritable(name, e))
    }

    fn load_abbreviations(&self) -> Result<AbbreviationTable, StoreError> {
        let name = self.layout.abbreviations.as_str();
        match self.read_optional(name)? {
            Some(contents) => {
                let table = AbbreviationTable::parse(&contents);
                info!(file = name, entries = table.len(), "abbreviations_loaded");
                Ok(table)
            }
            None => {
                warn!(file = name, "abbreviations_missing");
                Ok(AbbreviationTable::new())
            }
        }
    }
}
