//! Session credentials and the cookies derived from them.
//!
//! Credentials exist only as a complete set. [`SessionCredentials`] can be
//! built solely from a phase-2 login payload that carries all five fields, so
//! a client either holds a full set or none at all.

use chrono::{DateTime, Duration, Utc};

use crate::envelope::LoginResult;
use crate::errors::ProtocolFault;
use crate::{CookiePrefix, LoginToken, SessionId, UserId, UserName};

/// How far ahead the session cookie's `expires` attribute is set.
pub const SESSION_COOKIE_LIFETIME_DAYS: i64 = 7;

/// RFC 1123 date format used for cookie expiry.
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn required<T>(
    value: &Option<String>,
    field: &'static str,
    build: impl FnOnce(String) -> Option<T>,
) -> Result<T, ProtocolFault> {
    value
        .clone()
        .and_then(build)
        .ok_or(ProtocolFault::MissingField(field))
}

// ---------------------------------------------------------------------------
// Phase-1 handshake state
// ---------------------------------------------------------------------------

/// Values captured from a `NeedToken` reply, used only to build the phase-2
/// request. Never stored on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginHandshake {
    pub token: LoginToken,
    pub cookie_prefix: CookiePrefix,
    pub session_id: SessionId,
}

impl LoginHandshake {
    /// Extracts the handshake values from a phase-1 payload.
    pub fn from_login(login: &LoginResult) -> Result<Self, ProtocolFault> {
        Ok(Self {
            token: required(&login.token, "token", LoginToken::new)?,
            cookie_prefix: required(&login.cookieprefix, "cookieprefix", CookiePrefix::new)?,
            session_id: required(&login.sessionid, "sessionid", SessionId::new)?,
        })
    }

    /// Session-continuity cookie expected on the phase-2 request.
    pub fn continuity_cookie(&self) -> String {
        format!("{}_session={}", self.cookie_prefix, self.session_id)
    }
}

// ---------------------------------------------------------------------------
// Authenticated session
// ---------------------------------------------------------------------------

/// Credentials of a logged-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    login_token: LoginToken,
    user_id: UserId,
    user_name: UserName,
    cookie_prefix: CookiePrefix,
    session_id: SessionId,
}

impl SessionCredentials {
    /// Builds credentials from a phase-2 `Success` payload.
    ///
    /// Fails if any of the five fields is absent or empty.
    pub fn from_login(login: &LoginResult) -> Result<Self, ProtocolFault> {
        Ok(Self {
            login_token: required(&login.lgtoken, "lgtoken", LoginToken::new)?,
            user_id: required(&login.lguserid, "lguserid", UserId::new)?,
            user_name: required(&login.lgusername, "lgusername", UserName::new)?,
            cookie_prefix: required(&login.cookieprefix, "cookieprefix", CookiePrefix::new)?,
            session_id: required(&login.sessionid, "sessionid", SessionId::new)?,
        })
    }

    /// Token the server issued when the login completed.
    pub fn login_token(&self) -> &LoginToken {
        &self.login_token
    }

    /// Numeric id of the logged-in user, as the server sent it.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Canonical name of the logged-in user.
    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    /// Prefix of the wiki's session cookie names.
    pub fn cookie_prefix(&self) -> &CookiePrefix {
        &self.cookie_prefix
    }

    /// Server-side session the credentials belong to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// `Cookie` header value for privileged calls, expiring
    /// [`SESSION_COOKIE_LIFETIME_DAYS`] after `now`.
    pub fn session_cookie(&self, now: DateTime<Utc>) -> String {
        let expires =
            (now + Duration::days(SESSION_COOKIE_LIFETIME_DAYS)).format(COOKIE_DATE_FORMAT);
        let prefix = &self.cookie_prefix;
        format!(
            "{prefix}UserID={}; {prefix}UserName={}; {prefix}_session={}; expires={expires};path=/;httponly",
            self.user_id, self.user_name, self.session_id
        )
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("login_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("cookie_prefix", &self.cookie_prefix)
            .field("session_id", &self.session_id)
            .finish()
    }
}
