//! Client-side protocol core for a wiki's web API.
//!
//! Provides session login, page content retrieval, page create/update, and
//! page deletion. This crate holds every piece of protocol logic: the
//! token-acquisition and token-redemption exchanges, decoding of the JSON
//! reply envelopes, and the session credential lifecycle.
//!
//! ## Architectural Layer
//!
//! **Protocol logic + port definitions.** This crate performs no network I/O.
//! Requests leave through the [`Transport`] trait; the `transport` crate
//! supplies the HTTP implementation, and [`canned::CannedTransport`] answers
//! from fixed replies.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype wire identifiers (`PageTitle`, `SessionId`, tokens, etc.) |
//! | [`transport`] | The `Transport` port and the wire request/response types |
//! | [`envelope`] | Tagged-union decoding of reply envelopes |
//! | [`session`] | Session credentials and cookie construction |
//! | [`client`] | `WikiClient` and its four operations |
//! | [`config`] | Endpoint configuration |
//! | [`errors`] | Error, step, and retry-policy types |
//! | [`types`] | Operation result types |
//! | [`canned`] | Fixed-reply transport |

pub mod canned;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod session;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use client::WikiClient;
pub use config::WikiConfig;
pub use errors::{ConfigError, ProtocolFault, RetryPolicy, Step, WikiError};
pub use identifiers::{
    BaseTimestamp, CookiePrefix, DeleteToken, EditToken, LoginToken, PageTitle, SessionId, UserId,
    UserName,
};
pub use session::SessionCredentials;
pub use transport::{Method, Params, Transport, TransportError, WireRequest, WireResponse};
pub use types::EditOutcome;
