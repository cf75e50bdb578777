//! Queue-scoped operations.
//!
//! A [`Queue`] binds a queue name to a [`Transport`] and turns push, get,
//! delete and clear into requests against the queue's REST paths:
//!
//! | operation | request |
//! |-----------|---------|
//! | push      | `POST queues/{name}/messages` |
//! | get       | `GET queues/{name}/messages?n={limit}` |
//! | delete    | `DELETE queues/{name}/messages/{id}` |
//! | clear     | `POST queues/{name}/clear` |
//!
//! Every call is a single request/response exchange. Nothing is retried and
//! no state is kept between calls; the handle is immutable and can be cloned
//! or shared freely across tasks.

use crate::error::{QueueError, ValidationError};
use crate::message::{Ids, Message, MessageId, Messages, QueueName};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Page size used by [`Queue::get`] unless configured otherwise
pub const DEFAULT_MAX_PER_GET: u32 = 100;

/// Handle for one named queue
#[derive(Clone)]
pub struct Queue {
    transport: Arc<dyn Transport>,
    name: QueueName,
    max_per_get: u32,
}

impl Queue {
    /// Create a handle with the default page size
    pub fn new(transport: Arc<dyn Transport>, name: QueueName) -> Self {
        Self {
            transport,
            name,
            max_per_get: DEFAULT_MAX_PER_GET,
        }
    }

    /// Replace the page size used by [`get`](Self::get)
    ///
    /// # Errors
    ///
    /// Returns error if `max_per_get` is zero.
    pub fn with_max_per_get(mut self, max_per_get: u32) -> Result<Self, ValidationError> {
        validate_limit("max_per_get", max_per_get)?;
        self.max_per_get = max_per_get;
        Ok(self)
    }

    pub fn name(&self) -> &QueueName {
        &self.name
    }

    /// Number of messages requested by [`get`](Self::get)
    pub fn max_per_get(&self) -> u32 {
        self.max_per_get
    }

    // ========================================================================
    // Fetch
    // ========================================================================

    /// Retrieve up to [`max_per_get`](Self::max_per_get) messages.
    pub async fn get(&self) -> Result<Vec<Message>, QueueError> {
        self.get_messages(self.max_per_get).await
    }

    /// Retrieve a single message, or `None` when the queue is empty.
    pub async fn get_one(&self) -> Result<Option<Message>, QueueError> {
        Ok(self.get_messages(1).await?.into_iter().next())
    }

    /// Retrieve up to `limit` messages in the order the service returns them.
    ///
    /// An empty queue yields an empty vector. Messages are not removed;
    /// reservation and redelivery are decided by the service.
    ///
    /// # Errors
    ///
    /// Returns error if `limit` is zero, the request fails, or the response
    /// is not a message list.
    pub async fn get_messages(&self, limit: u32) -> Result<Vec<Message>, QueueError> {
        validate_limit("limit", limit)?;

        let path = format!("{}?n={}", self.messages_path(), limit);
        debug!(queue = %self.name, limit, "Fetching messages");

        let body = self.transport.get(&path).await?;
        let mut messages = Messages::from_body(&body)
            .map_err(|e| QueueError::decode("get", e))?
            .into_messages();

        let limit = limit as usize;
        if messages.len() > limit {
            warn!(
                queue = %self.name,
                limit,
                returned = messages.len(),
                "Service returned more messages than requested; dropping surplus"
            );
            messages.truncate(limit);
        }

        Ok(messages)
    }

    // ========================================================================
    // Push
    // ========================================================================

    /// Push one message and return its id.
    ///
    /// Sends exactly the same request as `push_messages(&[message])`.
    pub async fn push_message(&self, message: Message) -> Result<MessageId, QueueError> {
        let mut ids = self.push_messages(&[message]).await?;
        ids.pop()
            .ok_or_else(|| QueueError::decode("push", "no id returned for pushed message"))
    }

    /// Push a batch and return the assigned ids, aligned with `messages`.
    ///
    /// The batch is sent as a single request; there is no partial success.
    /// No size check is made, an oversized batch is rejected by the service.
    ///
    /// # Errors
    ///
    /// Returns error if `messages` is empty, the request fails, or the
    /// response does not carry exactly one id per message.
    pub async fn push_messages(&self, messages: &[Message]) -> Result<Vec<MessageId>, QueueError> {
        if messages.is_empty() {
            return Err(ValidationError::Required {
                field: "messages".to_string(),
            }
            .into());
        }

        let envelope = Messages::from(messages);
        let request = serde_json::to_string(&envelope).map_err(QueueError::Encode)?;

        debug!(queue = %self.name, count = envelope.len(), "Pushing messages");

        let body = self
            .transport
            .post(&self.messages_path(), Some(request))
            .await?;
        let ids = Ids::from_body(&body).map_err(|e| QueueError::decode("push", e))?;

        if ids.len() != messages.len() {
            return Err(QueueError::decode(
                "push",
                format!("expected {} ids, got {}", messages.len(), ids.len()),
            ));
        }

        Ok(ids.into_ids())
    }

    // ========================================================================
    // Delete / Clear
    // ========================================================================

    /// Delete a message by id.
    ///
    /// Deleting an id that no longer exists surfaces the service's error.
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), QueueError> {
        let path = format!(
            "{}/{}",
            self.messages_path(),
            urlencoding::encode(id.as_str())
        );
        debug!(queue = %self.name, message_id = %id, "Deleting message");

        self.transport.delete(&path).await?;
        Ok(())
    }

    /// Delete a message previously returned by a get.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the message has no id.
    pub async fn delete(&self, message: &Message) -> Result<(), QueueError> {
        let id = message.id().ok_or_else(|| ValidationError::Required {
            field: "message_id".to_string(),
        })?;
        self.delete_message(id).await
    }

    /// Remove every message from the queue.
    pub async fn clear(&self) -> Result<(), QueueError> {
        let path = format!("queues/{}/clear", self.name.path_segment());
        debug!(queue = %self.name, "Clearing queue");

        self.transport.post(&path, None).await?;
        Ok(())
    }

    fn messages_path(&self) -> String {
        format!("queues/{}/messages", self.name.path_segment())
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("max_per_get", &self.max_per_get)
            .finish_non_exhaustive()
    }
}

fn validate_limit(field: &str, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
