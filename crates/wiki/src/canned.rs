//! A transport that answers from fixed replies instead of a real wiki.
//!
//! [`CannedTransport`] picks its reply from the request's `action` and token
//! parameters and records every request it sees. It drives the CLI's offline
//! mode and lets the whole operation set run without a network.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::transport::{Transport, TransportError, WireRequest, WireResponse};

/// Content query for page `Test`.
pub const CONTENT_REPLY: &str = r#"{"query":{"pages":{"1":{"pageid":1,"ns":0,"title":"Test","revisions":[{"*":"Hello World!"}]}}}}"#;

/// Edit-token query for a page that does not exist yet.
pub const EDIT_TOKEN_REPLY: &str = r#"{"query":{"pages":{"-1":{"ns":0,"title":"Test2","missing":"","starttimestamp":"2014-11-21T00:46:40Z","edittoken":"+\\"}}}}"#;

/// Delete-token query for an existing page.
pub const DELETE_TOKEN_REPLY: &str = r#"{"query":{"pages":{"8":{"pageid":8,"ns":0,"title":"Test2","touched":"2014-11-21T00:49:02Z","lastrevid":24,"counter":0,"length":11,"starttimestamp":"2014-11-21T00:49:07Z","deletetoken":"491f3ee27f127e29e2391e015b593df4+\\"}}}}"#;

/// Login phase 1.
pub const LOGIN_NEED_TOKEN_REPLY: &str = r#"{"login":{"result":"NeedToken","token":"05041f6825fee077ae136a223c6fe36a","cookieprefix":"mediawiki","sessionid":"j8ev98c523544sa3jvb6s92er6"}}"#;

/// Login phase 2.
pub const LOGIN_SUCCESS_REPLY: &str = r#"{"login":{"result":"Success","lguserid":2,"lgusername":"Root","lgtoken":"6d878daa1e17d282e1587312531af82f","cookieprefix":"mediawiki","sessionid":"tch5b5ch34fcr5c8pf11lqerh2"}}"#;

/// Edit of an existing page.
pub const EDIT_REPLY: &str = r#"{"edit":{"result":"Success","pageid":5,"title":"Test2","oldrevid":17,"newrevid":18}}"#;

/// Delete of an existing page.
pub const DELETE_REPLY: &str = r#"{"delete":{"title":"Test2","reason":"content was: \"Content of Test2\" (and the only contributor was \"[[Special:Contributions/192.168.56.1|192.168.56.1]]\")"}}"#;

/// Reply to any request the transport has no canned answer for.
pub const UNKNOWN_ACTION_REPLY: &str = r#"{"error":{"code":"unknown_action","info":"Unrecognized value for parameter 'action'"}}"#;

/// Fixed-reply transport. Every reply has status `"OK"`.
#[derive(Debug, Default)]
pub struct CannedTransport {
    requests: Mutex<Vec<WireRequest>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects the reply for `request`.
    pub fn reply_for(request: &WireRequest) -> &'static str {
        let params = &request.parameters;
        match params.get("action") {
            Some("query") if params.get("rvprop") == Some("content") => CONTENT_REPLY,
            Some("query") => match params.get("intoken") {
                Some("edit") => EDIT_TOKEN_REPLY,
                Some("delete") => DELETE_TOKEN_REPLY,
                _ => UNKNOWN_ACTION_REPLY,
            },
            Some("login") if params.contains("lgtoken") => LOGIN_SUCCESS_REPLY,
            Some("login") => LOGIN_NEED_TOKEN_REPLY,
            Some("edit") => EDIT_REPLY,
            Some("delete") => DELETE_REPLY,
            _ => UNKNOWN_ACTION_REPLY,
        }
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(WireResponse::ok(Self::reply_for(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::transport::{Method, Params};

    fn request(params: Params) -> WireRequest {
        WireRequest::new(Method::Post, "http://localhost/api.php", params)
    }

    #[test]
    fn every_canned_reply_decodes() {
        for body in [
            CONTENT_REPLY,
            EDIT_TOKEN_REPLY,
            DELETE_TOKEN_REPLY,
            LOGIN_NEED_TOKEN_REPLY,
            LOGIN_SUCCESS_REPLY,
            EDIT_REPLY,
            DELETE_REPLY,
            UNKNOWN_ACTION_REPLY,
        ] {
            let envelope = Envelope::decode(body).unwrap();
            assert!(!matches!(envelope, Envelope::Unknown(_)), "{body}");
        }
    }

    #[test]
    fn login_reply_depends_on_the_token_parameter() {
        let phase_one = request(Params::new().with("action", "login"));
        assert_eq!(CannedTransport::reply_for(&phase_one), LOGIN_NEED_TOKEN_REPLY);

        let phase_two = request(Params::new().with("action", "login").with("lgtoken", "T1"));
        assert_eq!(CannedTransport::reply_for(&phase_two), LOGIN_SUCCESS_REPLY);
    }

    #[test]
    fn query_reply_depends_on_the_requested_token() {
        let edit = request(Params::new().with("action", "query").with("intoken", "edit"));
        assert_eq!(CannedTransport::reply_for(&edit), EDIT_TOKEN_REPLY);

        let delete = request(Params::new().with("action", "query").with("intoken", "delete"));
        assert_eq!(CannedTransport::reply_for(&delete), DELETE_TOKEN_REPLY);

        let bare = request(Params::new().with("action", "query"));
        assert_eq!(CannedTransport::reply_for(&bare), UNKNOWN_ACTION_REPLY);
    }

    #[tokio::test]
    async fn requests_are_recorded_in_order() {
        let transport = CannedTransport::new();
        transport
            .send(&request(Params::new().with("action", "edit")))
            .await
            .unwrap();
        transport
            .send(&request(Params::new().with("action", "delete")))
            .await
            .unwrap();

        let actions: Vec<_> = transport
            .requests()
            .iter()
            .map(|r| r.parameters.get("action").unwrap_or_default().to_string())
            .collect();
        assert_eq!(actions, ["edit", "delete"]);
    }
}
