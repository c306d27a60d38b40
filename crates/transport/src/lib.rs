//! HTTP adapter for the wiki protocol core.
//!
//! Implements the [`wiki::Transport`] trait on top of `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, timeouts, and the mapping of HTTP
//! statuses onto the transport status string live here. The [`wiki`] crate
//! sees only [`wiki::Transport`].
//!
//! Parameters are sent exactly as [`wiki::Params::serialize`] renders them:
//! appended to the URL for `GET`, as a form body for `POST`. Nothing is
//! encoded a second time. Redirects follow `reqwest`'s default policy, and no
//! request is ever retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use wiki::transport::STATUS_OK;
use wiki::{Method, Transport, TransportError, WireRequest, WireResponse};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub connect_timeout: Duration,
    /// Whole-exchange timeout, from connect to the last body byte.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!("wikictl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors raised while setting up an [`HttpTransport`].
#[derive(Debug, Error)]
pub enum HttpTransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// [`Transport`] that performs real HTTP exchanges.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }

    fn build(&self, request: &WireRequest) -> reqwest::RequestBuilder {
        let query = request.parameters.serialize();
        let mut builder = match request.method {
            Method::Get if query.is_empty() => self.http.get(&request.url),
            Method::Get => self.http.get(format!("{}?{query}", request.url)),
            Method::Post => self
                .http
                .post(&request.url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(query),
        };

        let mut cookie = request.cookie_header().map(str::to_owned);
        for (name, value) in &request.headers {
            if !name.eq_ignore_ascii_case(COOKIE.as_str()) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        for (name, value) in &request.cookies {
            let pair = format!("{name}={value}");
            cookie = Some(match cookie {
                Some(existing) => format!("{existing}; {pair}"),
                None => pair,
            });
        }
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder
    }
}

/// Maps an HTTP status onto the transport status string.
///
/// `200` becomes [`STATUS_OK`]; anything else becomes its reason phrase, or
/// the bare code when it has none.
pub fn status_text(status: StatusCode) -> String {
    if status == StatusCode::OK {
        return STATUS_OK.to_owned();
    }
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_u16().to_string())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: request.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        debug!(method = %request.method, status = status.as_u16(), "received response");

        let content = response.text().await.map_err(|e| TransportError::Body {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        Ok(WireResponse::new(status_text(status), content))
    }
}
