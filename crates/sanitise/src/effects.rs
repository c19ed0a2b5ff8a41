use serde::{Deserialize, Serialize};

/// An aggregate update requested by sanitisation.
///
/// The sanitiser never touches shared lists itself; it returns these and the
/// aggregate store applies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SideEffect {
    /// A URL removed from an email body. One per occurrence.
    QuarantineUrl(String),
    /// Sort code and nature of incident from an SIR email.
    RecordSir {
        sort_code: String,
        nature_of_incident: String,
    },
    /// A `#tag` token seen in a tweet, including the `#`.
    ObserveTag(String),
    /// An `@handle` token seen in a tweet, including the `@`.
    ObserveMention(String),
}
