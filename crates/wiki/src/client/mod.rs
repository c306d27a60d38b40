//! The protocol client.
//!
//! [`WikiClient`] sequences the exchanges each operation needs, threads
//! tokens and cookies from one exchange into the next, and owns the session
//! credentials.
//!
//! | Operation | Exchanges | Needs login |
//! |-----------|-----------|-------------|
//! | [`login`](WikiClient::login) | token request, token redemption | no |
//! | [`get_content`](WikiClient::get_content) | content query | no |
//! | [`edit_page`](WikiClient::edit_page) | edit-token query, edit | no |
//! | [`delete_page`](WikiClient::delete_page) | delete-token query, delete | yes |
//!
//! `login` takes `&mut self` and everything else `&self`, so a login can never
//! overlap an operation that reads the credentials.

mod login;
mod pages;

use tracing::{debug, warn};

use crate::config::WikiConfig;
use crate::envelope::Envelope;
use crate::errors::{ProtocolFault, Step, WikiError};
use crate::session::SessionCredentials;
use crate::transport::{Method, Params, Transport, WireRequest};

/// Client for one wiki, generic over the transport that carries its requests.
pub struct WikiClient<T> {
    endpoint: String,
    transport: T,
    credentials: Option<SessionCredentials>,
}

impl<T: Transport> WikiClient<T> {
    /// Creates an unauthenticated client for the API described by `config`.
    pub fn new(config: &WikiConfig, transport: T) -> Self {
        Self {
            endpoint: config.endpoint(),
            transport,
            credentials: None,
        }
    }

    /// Full URL of the API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Credentials of the current session, if logged in.
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.credentials.as_ref()
    }

    /// Whether a login has succeeded on this client.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds a request to the endpoint; every request asks for JSON.
    fn request(&self, method: Method, params: Params) -> WireRequest {
        WireRequest::new(method, self.endpoint.clone(), params.with("format", "json"))
    }

    /// Performs one exchange and decodes the reply.
    ///
    /// A transport error or a status other than `"OK"` fails before the body
    /// is looked at.
    async fn exchange(&self, step: Step, request: WireRequest) -> Result<Envelope, WikiError> {
        debug!(%step, method = %request.method, "sending request");

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| WikiError::TransportFailure {
                step,
                status: e.to_string(),
            })?;

        if !response.is_ok() {
            warn!(%step, status = %response.status, "transport reported failure");
            return Err(WikiError::TransportFailure {
                step,
                status: response.status,
            });
        }

        let envelope =
            Envelope::decode(&response.content).map_err(|f| WikiError::fault(step, f))?;
        debug!(%step, kind = envelope.kind(), "decoded reply");
        Ok(envelope)
    }
}

/// Error for a reply that lacks `field`.
fn missing(step: Step, field: &'static str) -> WikiError {
    WikiError::fault(step, ProtocolFault::MissingField(field))
}

/// Error for a reply whose shape `step` does not handle.
fn unrecognized(step: Step, envelope: Envelope) -> WikiError {
    let detail = match envelope {
        Envelope::Unknown(body) => body,
        other => format!("unexpected '{}' reply", other.kind()),
    };
    WikiError::fault(step, ProtocolFault::UnrecognizedResponse(detail))
}
