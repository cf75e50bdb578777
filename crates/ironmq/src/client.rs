//! Entry point binding a project configuration to queue handles.

use crate::config::ClientConfig;
use crate::error::{QueueError, ValidationError};
use crate::message::QueueName;
use crate::queue::Queue;
use crate::transport::{HttpTransport, Transport};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// IronMQ project client
///
/// Owns the shared transport; every [`Queue`] handed out by
/// [`queue`](Self::queue) reuses it.
///
/// # Example
///
/// ```no_run
/// use ironmq::{Client, ClientConfig, Message};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new(ClientConfig::new("my-project", "my-token"))?;
/// let queue = client.queue("jobs")?;
///
/// let id = queue.push_message(Message::new("hello").with_delay(5)).await?;
/// if let Some(message) = queue.get_one().await? {
///     queue.delete(&message).await?;
/// }
/// # let _ = id;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client talking HTTP to the configured cloud
    pub fn new(config: ClientConfig) -> Result<Self, QueueError> {
        let transport = HttpTransport::new(&config)?;
        info!(
            project_id = %config.project_id,
            host = %config.cloud.host,
            "Created IronMQ client"
        );
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client from an optional config file and `IRON_*` variables
    pub fn from_config_file(path: Option<&Path>) -> Result<Self, QueueError> {
        Self::new(ClientConfig::load(path)?)
    }

    /// Create a client over any transport implementation
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Get a handle for the named queue
    ///
    /// No request is made; the queue does not need to exist yet.
    pub fn queue(&self, name: &str) -> Result<Queue, ValidationError> {
        let name = QueueName::new(name.to_string())?;
        Ok(Queue::new(self.transport.clone(), name))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
