//! The HTTP side of extraction: the [`Transport`] seam, its reqwest implementation, and
//! the checks every polymer JSON response goes through before it is walked.

use crate::config::{ClientConfig, Localization};
use crate::error::ExtractError;
use eyre::Context;
use http::StatusCode;
use http::header::ACCEPT_LANGUAGE;
use serde_json::Value;
use std::future::Future;
use tracing::instrument;

/// Responses shorter than this are soft errors, whatever their status code says.
pub const MIN_RESPONSE_LENGTH: usize = 50;

/// A response as handed back by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }
}

/// Performs a single GET request.
///
/// Implementations own timeouts, proxies, and retries; the extractor issues each request
/// exactly once. A transport should return `Ok` for any response it managed to receive,
/// including non-success statuses, which the caller classifies.
pub trait Transport {
    fn fetch(
        &self,
        url: &str,
        headers: &[(&'static str, &str)],
        localization: &Localization,
    ) -> impl Future<Output = eyre::Result<Response>> + Send;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing client, e.g. one configured with timeouts or a proxy.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    #[instrument(skip(self, headers, localization), level = tracing::Level::TRACE)]
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&'static str, &str)],
        localization: &Localization,
    ) -> eyre::Result<Response> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, localization.language_tag());
        for &(name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send GET request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("read response body from {url}"))?;

        Ok(Response { status, body })
    }
}

/// Fetches `url` with the client headers and returns the payload of its polymer envelope.
///
/// The envelope is a JSON array whose element at index 1 carries the payload under
/// `response`. Nothing about the payload itself is checked here.
#[instrument(skip(transport, config), level = tracing::Level::DEBUG)]
pub(crate) async fn fetch_envelope<T>(
    transport: &T,
    url: &str,
    config: &ClientConfig,
) -> Result<Value, ExtractError>
where
    T: Transport + ?Sized,
{
    let response = transport
        .fetch(url, &config.client_headers(), &config.localization)
        .await
        .map_err(|e| ExtractError::transport(url, e))?;

    if !response.status.is_success() {
        let snippet: String = response.body.chars().take(200).collect();
        return Err(ExtractError::transport(
            url,
            eyre::eyre!("status {}: {}", response.status, snippet),
        ));
    }

    parse_envelope(url, &response.body)
}

fn parse_envelope(url: &str, body: &str) -> Result<Value, ExtractError> {
    if body.chars().count() < MIN_RESPONSE_LENGTH {
        return Err(ExtractError::invalid_response(
            url,
            format!("response is only {} characters long", body.chars().count()),
        ));
    }

    let mut envelope: Value =
        serde_json::from_str(body).map_err(|e| ExtractError::InvalidResponse {
            url: url.to_string(),
            reason: "response is not JSON".to_string(),
            source: Some(Box::new(e)),
        })?;

    if !envelope.is_array() {
        return Err(ExtractError::invalid_response(
            url,
            "response is not a JSON array",
        ));
    }

    match envelope.pointer_mut("/1/response") {
        Some(payload) if payload.is_object() => {
            tracing::trace!(bytes = body.len(), "unwrapped response envelope");
            Ok(payload.take())
        }
        _ => Err(ExtractError::invalid_response(
            url,
            "response has no payload object at [1].response",
        )),
    }
}
