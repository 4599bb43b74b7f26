//! A [`Transport`] that replays scripted replies, for tests that need
//! control over timing and ordering.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fetcher::{FetchError, FetchRequest, FetchResponse, Transport};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    /// A response whose body is sent as-is.
    Raw(StatusCode, Vec<u8>),
    /// No response at all; the message becomes the transport error.
    Fail(String),
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Duration,
}

/// Replies are consumed in request order; once the queue is empty every
/// request gets `200 null`.
#[derive(Debug)]
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    requests: Mutex<Vec<FetchRequest>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Scripted {
                reply: Reply::Json(StatusCode::OK, Value::Null),
                delay: Duration::ZERO,
            },
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.push_delayed(reply, Duration::ZERO);
    }

    pub fn push_delayed(&self, reply: Reply, delay: Duration) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted { reply, delay });
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: FetchRequest,
    ) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(request);
        let scripted = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        match scripted.reply {
            Reply::Json(status, body) => Ok(FetchResponse {
                status,
                body: serde_json::to_vec(&body)
                    .map_err(|e| FetchError::transport(e.to_string()))?,
            }),
            Reply::Raw(status, body) => Ok(FetchResponse { status, body }),
            Reply::Fail(message) => Err(FetchError::transport(message)),
        }
    }
}
