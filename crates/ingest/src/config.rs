//! Limits applied while validating message bodies.
//!
//! The defaults are the published message rules: 140 characters for SMS and
//! tweets, 1028 for emails, 20-character subjects, 12-character SIR subjects
//! and 16-character twitter IDs. They are configurable so the same validator
//! can be pointed at a test fixture with tighter limits.
//!
//! ```rust
//! use ingest::ValidationConfig;
//!
//! let cfg = ValidationConfig {
//!     sms_max_chars: 160,
//!     ..Default::default()
//! };
//! assert!(cfg.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    pub sms_max_chars: usize,

    pub tweet_max_chars: usize,

    pub email_max_chars: usize,

    pub subject_max_chars: usize,

    /// Exact length required of a subject starting with `SIR`.
    pub sir_subject_chars: usize,

    pub min_phone_chars: usize,

    /// Maximum twitter ID length, including the leading `@`.
    pub handle_max_chars: usize,

    /// Prompt text the input box starts with; a body that still begins with
    /// it has not been filled in.
    pub placeholder_prefix: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error(
        "sir_subject_chars ({sir}) exceeds subject_max_chars ({max}); \
         no SIR subject could ever validate"
    )]
    SirSubjectExceedsMax { sir: usize, max: usize },
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sms_max_chars: 140,
            tweet_max_chars: 140,
            email_max_chars: 1028,
            subject_max_chars: 20,
            sir_subject_chars: 12,
            min_phone_chars: 10,
            handle_max_chars: 16,
            placeholder_prefix: "Sender".into(),
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("sms_max_chars", self.sms_max_chars),
            ("tweet_max_chars", self.tweet_max_chars),
            ("email_max_chars", self.email_max_chars),
            ("subject_max_chars", self.subject_max_chars),
            ("sir_subject_chars", self.sir_subject_chars),
            ("handle_max_chars", self.handle_max_chars),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { field });
            }
        }

        if self.sir_subject_chars > self.subject_max_chars {
            return Err(ConfigError::SirSubjectExceedsMax {
                sir: self.sir_subject_chars,
                max: self.subject_max_chars,
            });
        }

        Ok(())
    }

    /// Body text limit for the given kind.
    pub fn max_chars_for(&self, kind: crate::MessageKind) -> usize {
        match kind {
            crate::MessageKind::Sms => self.sms_max_chars,
            crate::MessageKind::Email => self.email_max_chars,
            crate::MessageKind::Tweet => self.tweet_max_chars,
        }
    }
}
