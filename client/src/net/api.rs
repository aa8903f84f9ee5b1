//! REST client for the review backend.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): the transport reports a network error since reviews are
//! only submitted from the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes a `SubmitError` so the form can show it as a notice
//! and keep the draft.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use crate::state::auth::BearerCredential;
use crate::state::review::{ReviewDraft, SubmitError, SubmitReceipt, SubmitRequest};

/// Review submission path, relative to the API base URL.
pub const REVIEWS_PATH: &str = "/api/waffle/reviews";

/// Full review endpoint for `base_url`. An empty base keeps the request on the
/// page's own origin.
#[must_use]
pub fn reviews_endpoint(base_url: &str) -> String {
    format!("{}{REVIEWS_PATH}", base_url.trim().trim_end_matches('/'))
}

/// Raw HTTP answer from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one authenticated review POST. Enables fakes in tests.
#[async_trait::async_trait(?Send)]
pub trait ReviewTransport {
    /// POST `draft` as JSON to `url` with `credential` as the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Network`] if no HTTP answer was received.
    async fn post_review(
        &self,
        url: &str,
        credential: &BearerCredential,
        draft: &ReviewDraft,
    ) -> Result<HttpReply, SubmitError>;
}

/// Production transport backed by the browser's `fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpTransport;

#[async_trait::async_trait(?Send)]
impl ReviewTransport for HttpTransport {
    async fn post_review(
        &self,
        url: &str,
        credential: &BearerCredential,
        draft: &ReviewDraft,
    ) -> Result<HttpReply, SubmitError> {
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::post(url)
                .header("Authorization", &credential.authorization_header())
                .json(draft)
                .map_err(|e| SubmitError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| SubmitError::Network(e.to_string()))?;
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|e| {
                log::warn!("could not read review response body (status {status}): {e}");
                String::new()
            });
            Ok(HttpReply { status, body })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (url, credential, draft);
            Err(SubmitError::Network("not available on server".to_owned()))
        }
    }
}

/// Response body as JSON: parsed when possible, the raw text otherwise, and
/// `null` when empty.
#[must_use]
pub fn parse_payload(body: &str) -> serde_json::Value {
    if body.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_owned()))
}

/// Submit a captured review request.
///
/// # Errors
///
/// Returns [`SubmitError::Rejected`] for non-2xx answers and passes transport
/// errors through.
pub async fn submit_review<T>(
    transport: &T,
    endpoint: &str,
    request: &SubmitRequest,
) -> Result<SubmitReceipt, SubmitError>
where
    T: ReviewTransport + ?Sized,
{
    log::debug!("posting review for {:?}", request.draft.restaurant);
    let reply = transport.post_review(endpoint, &request.credential, &request.draft).await?;
    if !reply.is_success() {
        log::warn!("review backend answered {}: {}", reply.status, reply.body);
        return Err(SubmitError::Rejected { status: reply.status });
    }
    Ok(SubmitReceipt { status: reply.status, payload: parse_payload(&reply.body) })
}
