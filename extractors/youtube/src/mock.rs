//! In-memory [`Transport`] for testing code that drives a
//! [`ChannelExtractor`](crate::ChannelExtractor) without touching the network.
//!
//! Responses are registered per URL and handed out in order; the last registered response
//! for a URL keeps being returned once the others are used up. Every request is recorded so
//! tests can assert on what was sent.

use crate::config::Localization;
use crate::transport::{Response, Transport};
use http::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum MockReply {
    Response(Response),
    Failure(String),
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub language_tag: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, VecDeque<MockReply>>,
    requests: Vec<RecordedRequest>,
}

/// Replays canned responses keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status for `url`.
    pub async fn respond(&self, url: impl Into<String>, status: StatusCode, body: impl Into<String>) {
        self.push(
            url.into(),
            MockReply::Response(Response {
                status,
                body: body.into(),
            }),
        )
        .await;
    }

    /// Queue a `200 OK` response for `url`.
    pub async fn respond_ok(&self, url: impl Into<String>, body: impl Into<String>) {
        self.respond(url, StatusCode::OK, body).await;
    }

    /// Queue a transport-level failure (no response at all) for `url`.
    pub async fn fail(&self, url: impl Into<String>, message: impl Into<String>) {
        self.push(url.into(), MockReply::Failure(message.into()))
            .await;
    }

    /// All requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// How many requests were made for `url`.
    pub async fn request_count(&self, url: &str) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    async fn push(&self, url: String, reply: MockReply) {
        self.state
            .lock()
            .await
            .replies
            .entry(url)
            .or_default()
            .push_back(reply);
    }
}

impl Transport for MockTransport {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&'static str, &str)],
        localization: &Localization,
    ) -> eyre::Result<Response> {
        let mut state = self.state.lock().await;
        state.requests.push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|&(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            language_tag: localization.language_tag(),
        });
        tracing::debug!(url, "mock transport received request");

        let Some(queue) = state.replies.get_mut(url) else {
            eyre::bail!("no mock response registered for {url}");
        };
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(message)) => Err(eyre::eyre!(message)),
            None => eyre::bail!("no mock response left for {url}"),
        }
    }
}
