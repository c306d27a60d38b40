//! Shared helpers for the client flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use wiki::{Transport, TransportError, WikiClient, WikiConfig, WireRequest, WireResponse};

pub const BASE_URL: &str = "http://wiki.test";
pub const ENDPOINT: &str = "http://wiki.test/api.php";

/// Replays queued responses in order and records every request.
///
/// A request arriving after the queue is exhausted fails with a
/// [`TransportError`], so an unexpected extra exchange shows up as an error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<WireResponse>>,
    requests: Mutex<Vec<WireRequest>>,
}

impl ScriptedTransport {
    pub fn new<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_responses(bodies.into_iter().map(WireResponse::ok))
    }

    pub fn with_responses(responses: impl IntoIterator<Item = WireResponse>) -> Self {
        Self {
            replies: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, index: usize) -> WireRequest {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no request #{index} was sent"))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Request {
                url: request.url.clone(),
                message: "no scripted reply left".into(),
            })
    }
}

pub fn client(transport: ScriptedTransport) -> WikiClient<ScriptedTransport> {
    WikiClient::new(&WikiConfig::new(BASE_URL).unwrap(), transport)
}

pub const NEED_TOKEN: &str = r#"{"login":{"result":"NeedToken","token":"T1","cookieprefix":"mw","sessionid":"S1"}}"#;

pub const LOGIN_SUCCESS: &str = r#"{"login":{"result":"Success","lguserid":2,"lgusername":"Root","lgtoken":"T2","cookieprefix":"mw","sessionid":"S2"}}"#;

/// A client that has completed the login handshake; its transport still holds
/// `replies` for the calls that follow.
pub async fn logged_in_client<'a>(
    replies: impl IntoIterator<Item = &'a str>,
) -> WikiClient<ScriptedTransport> {
    let mut bodies = vec![NEED_TOKEN, LOGIN_SUCCESS];
    bodies.extend(replies);
    let mut client = client(ScriptedTransport::new(bodies));
    client.login("root", "secret").await.unwrap();
    client
}
