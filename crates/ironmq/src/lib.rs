//! # IronMQ
//!
//! Typed async client for the IronMQ hosted message queue.
//!
//! This library provides:
//! - Queue handles with push, get, delete and clear operations
//! - Batch push with ids aligned to the pushed messages
//! - An HTTP transport with OAuth token authentication
//! - Configuration from code, an `iron.json` style file, or `IRON_*` variables
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for all queue operations
//! - [`message`] - Messages, identifiers and wire envelopes
//! - [`queue`] - Queue-scoped operations
//! - [`transport`] - Transport trait and HTTP implementation
//! - [`client`] - Project client handing out queue handles
//! - [`config`] - Client configuration and loading

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod queue;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use client::Client;
pub use config::{ClientConfig, Cloud};
pub use error::{ConfigurationError, QueueError, TransportError, ValidationError};
pub use message::{Ids, Message, MessageId, Messages, QueueName};
pub use queue::{Queue, DEFAULT_MAX_PER_GET};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
