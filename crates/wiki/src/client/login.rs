//! Two-phase login handshake.
//!
//! Phase 1 posts the user's name and password and gets back a single-use token
//! plus the session the server opened for it. Phase 2 posts the same
//! credentials together with that token, inside the session cookie, and the
//! server answers with the identity of the logged-in user.

use tracing::{info, instrument};

use super::{unrecognized, WikiClient};
use crate::envelope::Envelope;
use crate::errors::{ProtocolFault, Step, WikiError};
use crate::session::{LoginHandshake, SessionCredentials};
use crate::transport::{Method, Params, Transport};

const NEED_TOKEN: &str = "NeedToken";
const SUCCESS: &str = "Success";

fn login_params(username: &str, password: &str) -> Params {
    Params::new()
        .with("action", "login")
        .with_encoded("lgname", username)
        .with_encoded("lgpassword", password)
}

impl<T: Transport> WikiClient<T> {
    /// Logs in as `username`.
    ///
    /// On success the session credentials are replaced as a whole; on failure
    /// whatever session the client held before is left as it was.
    #[instrument(name = "login", skip_all, fields(user = %username))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), WikiError> {
        let handshake = self.request_login_token(username, password).await?;
        let credentials = self.confirm_login(username, password, &handshake).await?;

        info!(
            user_id = %credentials.user_id(),
            user_name = %credentials.user_name(),
            "logged in"
        );
        self.credentials = Some(credentials);
        Ok(())
    }

    async fn request_login_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginHandshake, WikiError> {
        let step = Step::LoginToken;
        let request = self.request(Method::Post, login_params(username, password));

        match self.exchange(step, request).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Login(login) if login.result == NEED_TOKEN => {
                LoginHandshake::from_login(&login).map_err(|f| WikiError::fault(step, f))
            }
            Envelope::Login(login) => Err(WikiError::fault(
                step,
                ProtocolFault::UnexpectedResult {
                    expected: NEED_TOKEN,
                    actual: login.result,
                },
            )),
            other => Err(unrecognized(step, other)),
        }
    }

    async fn confirm_login(
        &self,
        username: &str,
        password: &str,
        handshake: &LoginHandshake,
    ) -> Result<SessionCredentials, WikiError> {
        let step = Step::LoginConfirm;
        let params =
            login_params(username, password).with_encoded("lgtoken", handshake.token.as_str());
        let request = self
            .request(Method::Post, params)
            .with_header("Cookie", handshake.continuity_cookie());

        match self.exchange(step, request).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Login(login) if login.result == SUCCESS => {
                SessionCredentials::from_login(&login).map_err(|f| WikiError::fault(step, f))
            }
            Envelope::Login(login) => Err(WikiError::fault(
                step,
                ProtocolFault::UnexpectedResult {
                    expected: SUCCESS,
                    actual: login.result,
                },
            )),
            other => Err(unrecognized(step, other)),
        }
    }
}
