use serde::{Deserialize, Deserializer, Serialize};

/// A message after its body has been sanitised.
///
/// This is the record kept in the message log. Two messages are the same
/// message when all four fields are equal. The serialized field names match
/// the `StoredMessages.json` layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SanitisedMessage {
    #[serde(rename = "Header")]
    pub header: String,

    #[serde(rename = "Sender")]
    pub sender: String,

    /// Email subject; `None` for SMS and tweets. An empty string on disk
    /// reads back as `None`.
    #[serde(rename = "Subject", default, deserialize_with = "empty_as_none")]
    pub subject: Option<String>,

    #[serde(rename = "MessageText")]
    pub body: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
