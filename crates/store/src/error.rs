use thiserror::Error;

/// Errors raised while loading or flushing aggregate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("cannot read {file}: {reason}")]
    Unreadable { file: String, reason: String },

    #[error("cannot write {file}: {reason}")]
    Unwritable { file: String, reason: String },

    #[error("malformed record in {file} line {line}: {reason}")]
    MalformedRecord {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("malformed JSON in {file}: {reason}")]
    MalformedJson { file: String, reason: String },
}

impl StoreError {
    pub fn unreadable<E: std::fmt::Display>(file: impl Into<String>, err: E) -> Self {
        Self::Unreadable {
            file: file.into(),
            reason: err.to_string(),
        }
    }

    pub fn unwritable<E: std::fmt::Display>(file: impl Into<String>, err: E) -> Self {
        Self::Unwritable {
            file: file.into(),
            reason: err.to_string(),
        }
    }

    /// True for failures during a flush, after in-memory state already changed.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, StoreError::Unwritable { .. })
    }
}
