//! Common test utilities for ironmq integration tests
//!
//! This module provides:
//! - A stateful fake of the IronMQ v1 REST API built on wiremock
//! - Helpers for creating clients pointed at the fake

use ironmq::{Client, ClientConfig, Cloud, Queue};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PROJECT_ID: &str = "test-project";
pub const TOKEN: &str = "test-token";

// ============================================================================
// Fake Service
// ============================================================================

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    body: String,
    timeout: u64,
    delay: u64,
    expires_in: u64,
}

#[derive(Default)]
struct ServiceState {
    queues: HashMap<String, VecDeque<StoredMessage>>,
    next_id: u64,
}

/// In-memory IronMQ service
///
/// Messages are kept in push order and are not reserved by a get, so a
/// message stays visible until it is deleted or the queue is cleared.
#[derive(Clone, Default)]
pub struct FakeIronMq {
    state: Arc<Mutex<ServiceState>>,
}

impl FakeIronMq {
    /// Start a mock server with the fake mounted for [`PROJECT_ID`]
    pub async fn start() -> (MockServer, FakeIronMq) {
        let server = MockServer::start().await;
        let fake = FakeIronMq::default();

        Mock::given(path_regex(format!(r"^/1/projects/{}/queues/", PROJECT_ID)))
            .respond_with(fake.clone())
            .mount(&server)
            .await;

        (server, fake)
    }

    /// Number of messages currently stored in `queue`
    #[allow(dead_code)]
    pub fn len(&self, queue: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.queues.get(queue).map_or(0, VecDeque::len)
    }

    fn push(&self, queue: &str, request: &Request) -> ResponseTemplate {
        let payload: Value = match serde_json::from_slice(&request.body) {
            Ok(value) => value,
            Err(_) => return error_response(400, "Invalid JSON"),
        };
        let Some(messages) = payload["messages"].as_array() else {
            return error_response(400, "Missing messages");
        };

        let mut state = self.state.lock().unwrap();
        let mut ids = Vec::with_capacity(messages.len());
        for message in messages {
            state.next_id += 1;
            let stored = StoredMessage {
                id: state.next_id.to_string(),
                body: message["body"].as_str().unwrap_or_default().to_string(),
                timeout: message["timeout"].as_u64().unwrap_or_default(),
                delay: message["delay"].as_u64().unwrap_or_default(),
                expires_in: message["expires_in"].as_u64().unwrap_or_default(),
            };
            ids.push(stored.id.clone());
            state
                .queues
                .entry(queue.to_string())
                .or_default()
                .push_back(stored);
        }

        ResponseTemplate::new(200).set_body_json(json!({
            "ids": ids,
            "msg": "Messages put on queue."
        }))
    }

    fn get(&self, queue: &str, request: &Request) -> ResponseTemplate {
        let limit = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "n")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(1);

        let state = self.state.lock().unwrap();
        let messages: Vec<Value> = state
            .queues
            .get(queue)
            .into_iter()
            .flatten()
            .take(limit)
            .map(|m| {
                json!({
                    "id": m.id,
                    "body": m.body,
                    "timeout": m.timeout,
                    "delay": m.delay,
                    "expires_in": m.expires_in
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({ "messages": messages }))
    }

    fn delete(&self, queue: &str, id: &str) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let Some(messages) = state.queues.get_mut(queue) else {
            return error_response(404, "Queue not found");
        };
        let Some(position) = messages.iter().position(|m| m.id == id) else {
            return error_response(404, "Message not found");
        };

        messages.remove(position);
        ResponseTemplate::new(200).set_body_json(json!({ "msg": "Deleted" }))
    }

    fn clear(&self, queue: &str) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        state.queues.remove(queue);
        ResponseTemplate::new(200).set_body_json(json!({ "msg": "Cleared" }))
    }
}

impl Respond for FakeIronMq {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some(format!("OAuth {}", TOKEN).as_str());
        if !authorized {
            return error_response(401, "Invalid authentication");
        }

        // /1/projects/{project}/queues/{queue}/...
        let segments: Vec<&str> = request.url.path_segments().into_iter().flatten().collect();
        let method = request.method.as_str();
        match segments.as_slice() {
            [_, _, _, _, queue, "messages"] if method == "POST" => self.push(queue, request),
            [_, _, _, _, queue, "messages"] if method == "GET" => self.get(queue, request),
            [_, _, _, _, queue, "messages", id] if method == "DELETE" => self.delete(queue, id),
            [_, _, _, _, queue, "clear"] if method == "POST" => self.clear(queue),
            _ => error_response(404, "Not found"),
        }
    }
}

fn error_response(status: u16, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "msg": msg }))
}

// ============================================================================
// Client Helpers
// ============================================================================

/// Configuration pointing at `server` with the given token
#[allow(dead_code)]
pub fn config_for(server: &MockServer, token: &str) -> ClientConfig {
    let address = server.address();
    ClientConfig::new(PROJECT_ID, token).with_cloud(Cloud::new(
        "http",
        address.ip().to_string(),
        address.port(),
    ))
}

/// Queue handle for `name` on `server`, authenticated with [`TOKEN`]
#[allow(dead_code)]
pub fn queue_for(server: &MockServer, name: &str) -> Queue {
    Client::new(config_for(server, TOKEN))
        .unwrap()
        .queue(name)
        .unwrap()
}
