//! Message types for queue operations including core domain identifiers.
//!
//! Besides the [`Message`] record itself this module holds the two wire
//! envelopes used by the queue endpoints: [`Messages`], the list wrapper
//! shared by push requests and get responses, and [`Ids`], the body of a
//! push response.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated queue name
///
/// The name is placed into request paths, so it must be non-empty and
/// free of path and query delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: String) -> Result<Self, ValidationError> {
        if name.is_empty() || name.len() > 255 {
            return Err(ValidationError::OutOfRange {
                field: "queue_name".to_string(),
                message: "must be 1-255 characters".to_string(),
            });
        }

        if name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#'))
        {
            return Err(ValidationError::InvalidFormat {
                field: "queue_name".to_string(),
                message: "whitespace, control characters, '/', '?' and '#' are not allowed"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name percent-encoded for use as a single path segment.
    pub(crate) fn path_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Service-assigned message identifier
///
/// Decoding goes through [`MessageId::new`], so an empty id in a service
/// response fails to decode instead of producing an unusable handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an id returned by the service
    pub fn new(id: String) -> Result<Self, ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::Required {
                field: "message_id".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for MessageId {
    type Error = ValidationError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// A single queue item
///
/// Callers build messages with [`Message::new`] and the `with_*` builders;
/// the `id` is only ever filled in when a message is read back from the
/// service and is never sent on push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(skip_serializing, default)]
    id: Option<MessageId>,

    pub body: String,

    /// Seconds the message stays reserved after a get before it becomes
    /// visible again. 0 lets the service apply its default.
    #[serde(default)]
    pub timeout: u64,

    /// Seconds before a pushed message becomes available.
    #[serde(default)]
    pub delay: u64,

    /// Seconds the message is retained before the service expires it.
    /// 0 lets the service apply its default.
    #[serde(default)]
    pub expires_in: u64,
}

impl Message {
    /// Create new message with body
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            id: None,
            body: body.into(),
            timeout: 0,
            delay: 0,
            expires_in: 0,
        }
    }

    /// Set the reservation timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the delivery delay in seconds
    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the expiration in seconds
    pub fn with_expires_in(mut self, expires_in: u64) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Service-assigned id; `None` for messages that were never read back.
    pub fn id(&self) -> Option<&MessageId> {
        self.id.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: &str) -> Self {
        self.id = Some(MessageId(id.to_string()));
        self
    }
}

// ============================================================================
// Wire Envelopes
// ============================================================================

/// List wrapper used by push requests and get responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default, deserialize_with = "null_as_empty")]
    messages: Vec<Message>,
}

impl Messages {
    /// Wrap a single message
    pub fn from_message(message: Message) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Decode a get response body.
    ///
    /// A blank body, `{}` and `{"messages": null}` all decode to an empty
    /// envelope; anything else that is not the expected shape fails.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Option<Self>>(body)? {
            Some(envelope) => Ok(envelope),
            None => Ok(Self::default()),
        }
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl From<&[Message]> for Messages {
    fn from(messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
        }
    }
}

/// Push response body: ids positionally aligned with the pushed messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ids {
    #[serde(default, deserialize_with = "null_as_empty")]
    ids: Vec<MessageId>,
}

impl Ids {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_ids(self) -> Vec<MessageId> {
        self.ids
    }

    /// Decode a push response body
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
