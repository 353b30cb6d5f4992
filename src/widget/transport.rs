//! Network side of the widget: one JSON POST per submission.

use async_trait::async_trait;
use url::Url;

use super::error::Result;
use super::message::ChatRequest;
use super::CHAT_PATH;

/// Status and body of a `/chat` response, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers a chat request to the backend.
///
/// Implementations report transport failures as errors and hand back any
/// response they receive, whatever its status.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> Result<RawReply>;
}

/// [`ChatTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Target `<base_url>/chat`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Same as [`HttpTransport::new`] with a caller-supplied client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let endpoint = Url::parse(base_url.as_ref())?.join(CHAT_PATH)?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<RawReply> {
        // `.json()` sets `Content-Type: application/json`.
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let t = HttpTransport::new("http://localhost:5000").unwrap();
        assert_eq!(t.endpoint().as_str(), "http://localhost:5000/chat");

        let t = HttpTransport::new("http://example.com/app/").unwrap();
        assert_eq!(t.endpoint().as_str(), "http://example.com/chat");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[test]
    fn test_success_range() {
        let ok = RawReply { status: 204, body: String::new() };
        let bad = RawReply { status: 500, body: String::new() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
