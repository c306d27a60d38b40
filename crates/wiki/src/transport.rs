//! The transport port: the single I/O seam of the protocol client.
//!
//! The client builds a [`WireRequest`], hands it to a [`Transport`], and gets
//! back a [`WireResponse`] holding a status string and the raw body text. The
//! transport knows nothing about the wiki protocol; the client knows nothing
//! about sockets.
//!
//! ## Parameter encoding
//!
//! [`Params::serialize`] joins `k=v` pairs with `&` and applies **no**
//! encoding. Values that may contain reserved characters are encoded by the
//! client when it builds the request ([`Params::with_encoded`]); transports
//! must send the serialized form unchanged so those values are not encoded
//! twice.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Status string a transport reports for a successful exchange.
pub const STATUS_OK: &str = "OK";

/// HTTP verb of a [`WireRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Parameters travel in the URL query string.
    Get,
    /// Parameters travel as an `application/x-www-form-urlencoded` body.
    Post,
}

impl Method {
    /// Returns the verb as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Ordered request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter whose value is sent verbatim.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter whose value is percent-encoded first.
    pub fn with_encoded(self, key: impl Into<String>, value: &str) -> Self {
        let encoded = urlencoding::encode(value).into_owned();
        self.with(key, encoded)
    }

    /// Returns the stored (possibly encoded) value of the first `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Joins the parameters as `k=v&k=v` without further encoding.
    pub fn serialize(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One request for the transport to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    /// Full API endpoint, without a query string.
    pub url: String,
    pub parameters: Params,
    /// Extra request headers, sent verbatim.
    pub headers: BTreeMap<String, String>,
    /// Cookies to send, joined by the transport into a `Cookie` header.
    pub cookies: BTreeMap<String, String>,
}

impl WireRequest {
    pub fn new(method: Method, url: impl Into<String>, parameters: Params) -> Self {
        Self {
            method,
            url: url.into(),
            parameters,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Returns the value of the `Cookie` header, if one was set.
    pub fn cookie_header(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("cookie"))
            .map(|(_, value)| value.as_str())
    }
}

/// What the transport got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    /// Status description; [`STATUS_OK`] on success.
    pub status: String,
    /// Raw body text.
    pub content: String,
}

impl WireResponse {
    pub fn new(status: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            content: content.into(),
        }
    }

    /// A successful response carrying `content`.
    pub fn ok(content: impl Into<String>) -> Self {
        Self::new(STATUS_OK, content)
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// The exchange could not be completed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// A response arrived but its body could not be read.
    #[error("could not read response body from {url}: {message}")]
    Body { url: String, message: String },
}

// ---------------------------------------------------------------------------
// Port trait
// ---------------------------------------------------------------------------

/// Performs one network exchange.
///
/// Implementations must not retry, must not interpret the body, and must send
/// [`Params::serialize`] output unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send(request).await
    }
}
