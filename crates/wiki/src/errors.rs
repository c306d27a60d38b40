//! Error and retry-policy types for the wiki protocol client.
//!
//! [`WikiError`] is the single error type returned by every
//! [`WikiClient`](crate::WikiClient) operation. Its variants separate the
//! expected branch a caller routinely handles ([`WikiError::PageNotFound`])
//! from the exceptional ones (protocol faults, transport failures, missing
//! authentication).
//!
//! [`ProtocolFault`] describes *what* was wrong with a reply and is shared by
//! the generic protocol path and the login-specific path.

use std::time::Duration;

use thiserror::Error;

use crate::PageTitle;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Advisory only: the client never retries on its own. Callers that wrap the
/// client in their own retry loop use this to decide whether to re-invoke an
/// operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// Retrying the same call will produce the same failure.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Exchange steps
// ---------------------------------------------------------------------------

/// Names the request/response exchange an error came from.
///
/// Each public operation is made of one or two exchanges; the step pins down
/// which one failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Login phase 1: requesting the login token.
    LoginToken,
    /// Login phase 2: redeeming the login token.
    LoginConfirm,
    /// Reading the latest revision of a page.
    FetchContent,
    /// Requesting an edit token and base timestamp.
    EditToken,
    /// Submitting the edit.
    EditSubmit,
    /// Requesting a delete token.
    DeleteToken,
    /// Submitting the delete.
    DeleteSubmit,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::LoginToken => "login token request",
            Step::LoginConfirm => "login confirmation",
            Step::FetchContent => "content fetch",
            Step::EditToken => "edit token request",
            Step::EditSubmit => "edit submission",
            Step::DeleteToken => "delete token request",
            Step::DeleteSubmit => "delete submission",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Protocol faults
// ---------------------------------------------------------------------------

/// What was wrong with a decoded (or undecodable) reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolFault {
    /// The server answered with an `error` envelope.
    #[error("{code} - {info}")]
    Remote {
        /// Machine-readable error code (e.g. `"badtoken"`).
        code: String,
        /// Human-readable description supplied by the server.
        info: String,
    },

    /// The server refused the request with a `warnings` envelope
    /// (e.g. "Action 'delete' is not allowed for the current user").
    #[error("{0}")]
    Warning(String),

    /// A `result` field carried a value the flow does not accept.
    #[error("unexpected result '{actual}' (expected '{expected}')")]
    UnexpectedResult {
        /// The value the flow requires.
        expected: &'static str,
        /// The value the server sent.
        actual: String,
    },

    /// The reply had none of the envelope shapes this step understands.
    #[error("unrecognized response: {0}")]
    UnrecognizedResponse(String),

    /// The envelope shape was right but a required member was absent or empty.
    #[error("response is missing '{0}'")]
    MissingField(&'static str),

    /// The body was not valid JSON, or a section had the wrong JSON types.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors returned by the protocol client.
#[derive(Debug, Error)]
pub enum WikiError {
    /// The transport did not report `"OK"`, or could not complete the
    /// exchange at all. No part of the body is trusted.
    #[error("Transport failure during {step}: {status}")]
    TransportFailure {
        /// Exchange that failed.
        step: Step,
        /// Status text reported by the transport, or its error message.
        status: String,
    },

    /// The reply was an `error` envelope, had an unrecognized shape, or
    /// carried an unexpected result value.
    #[error("Protocol error during {step}: {fault}")]
    Protocol {
        /// Exchange that failed.
        step: Step,
        /// What was wrong with the reply.
        fault: ProtocolFault,
    },

    /// The requested page does not exist.
    ///
    /// An expected outcome: callers typically branch on it (e.g. before
    /// creating the page) rather than treat it as a failure.
    #[error("Page '{title}' not found")]
    PageNotFound {
        /// Title that was looked up.
        title: PageTitle,
    },

    /// The operation needs a logged-in session and the client has none.
    ///
    /// Raised locally, before any request is sent.
    #[error("Not logged in: {step} requires an authenticated session")]
    NotAuthenticated {
        /// First exchange the operation would have issued.
        step: Step,
    },

    /// The two-phase login handshake failed.
    #[error("Login failed during {step}: {fault}")]
    Auth {
        /// Handshake phase that failed.
        step: Step,
        /// What was wrong with the reply.
        fault: ProtocolFault,
    },
}

impl WikiError {
    /// Wraps a reply fault: login steps yield [`WikiError::Auth`], all other
    /// steps [`WikiError::Protocol`].
    pub(crate) fn fault(step: Step, fault: ProtocolFault) -> Self {
        match step {
            Step::LoginToken | Step::LoginConfirm => WikiError::Auth { step, fault },
            _ => WikiError::Protocol { step, fault },
        }
    }

    /// Returns whether re-issuing the failed operation could succeed.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            WikiError::TransportFailure { .. } => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// Returns `true` for [`WikiError::PageNotFound`].
    pub fn is_page_not_found(&self) -> bool {
        matches!(self, WikiError::PageNotFound { .. })
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors produced while building a [`WikiConfig`](crate::WikiConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing configuration value: {key}")]
    Missing {
        /// Environment variable or option name.
        key: &'static str,
    },

    /// The base URL is empty or does not use `http://` or `https://`.
    #[error("invalid wiki base URL: '{url}'")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        let transport = WikiError::TransportFailure {
            step: Step::EditSubmit,
            status: "Service Unavailable".into(),
        };
        assert_eq!(
            transport.retry_policy(),
            RetryPolicy::Retryable { after: None }
        );

        let missing = WikiError::PageNotFound {
            title: PageTitle::new("Missing").unwrap(),
        };
        assert_eq!(missing.retry_policy(), RetryPolicy::NonRetryable);
        assert!(missing.is_page_not_found());

        let remote = WikiError::Protocol {
            step: Step::FetchContent,
            fault: ProtocolFault::Remote {
                code: "readapidenied".into(),
                info: "You need read permission".into(),
            },
        };
        assert_eq!(remote.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn messages_name_the_failing_step() {
        let err = WikiError::Auth {
            step: Step::LoginConfirm,
            fault: ProtocolFault::UnexpectedResult {
                expected: "Success",
                actual: "WrongPass".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Login failed during login confirmation: unexpected result 'WrongPass' (expected 'Success')"
        );

        let err = WikiError::Protocol {
            step: Step::DeleteToken,
            fault: ProtocolFault::Warning(
                "Action 'delete' is not allowed for the current user".into(),
            ),
        };
        assert_eq!(
            err.to_string(),
            "Protocol error during delete token request: Action 'delete' is not allowed for the current user"
        );
    }
}
