//! Newtype wire identifiers.
//!
//! Every opaque string the remote API hands out (page titles, session ids,
//! tokens, timestamps) is represented as a distinct newtype, so a
//! [`LoginToken`] cannot be sent where an [`EditToken`] is expected even
//! though both are plain strings on the wire.
//!
//! None of these types interpret their contents. In particular
//! [`BaseTimestamp`] is kept as the exact string the server sent, because it
//! is echoed back verbatim on the following edit.

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (@common $name:ident) => {
        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };

    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        string_id!(@common $name);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for secret-bearing newtypes.
// Same constructor surface as `string_id!`, but no Display and a redacted Debug.
// ---------------------------------------------------------------------------
macro_rules! secret_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        string_id!(@common $name);

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}([REDACTED])", stringify!($name))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Page identity
// ---------------------------------------------------------------------------

string_id! {
    /// The title of a wiki page, exactly as the caller supplied it.
    PageTitle
}

string_id! {
    /// Last-known modification time of a page, as the raw wire string
    /// (e.g. `"2014-11-21T00:46:40Z"`).
    ///
    /// Submitted back as `basetimestamp` so the server can reject an edit that
    /// conflicts with a newer revision.
    BaseTimestamp
}

// ---------------------------------------------------------------------------
// Session identity
// ---------------------------------------------------------------------------

string_id! {
    /// Numeric user id assigned by the wiki, kept in its decimal string form.
    UserId
}

string_id! {
    /// Canonical user name reported by the wiki after login.
    UserName
}

string_id! {
    /// Site-specific prefix namespacing the session cookies (e.g. `"mediawiki"`).
    CookiePrefix
}

string_id! {
    /// Opaque session identifier issued by the wiki.
    SessionId
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

secret_id! {
    /// Token issued by the login handshake.
    ///
    /// During phase 1 this is the single-use token to redeem; after phase 2 it
    /// is the post-login token stored with the session.
    LoginToken
}

secret_id! {
    /// Action-scoped token authorising one edit.
    EditToken
}

secret_id! {
    /// Action-scoped token authorising one delete.
    DeleteToken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_rejected() {
        assert!(PageTitle::new("").is_none());
        assert!(SessionId::new(String::new()).is_none());
        assert!(EditToken::new("").is_none());
    }

    #[test]
    fn timestamps_are_kept_verbatim() {
        let ts = BaseTimestamp::new("2014-11-21T00:46:40Z").unwrap();
        assert_eq!(ts.as_str(), "2014-11-21T00:46:40Z");
        assert_eq!(ts.to_string(), "2014-11-21T00:46:40Z");
    }

    #[test]
    fn tokens_are_redacted_in_debug_output() {
        let token = LoginToken::new("6d878daa1e17d282e1587312531af82f").unwrap();
        let rendered = format!("{token:?}");
        assert_eq!(rendered, "LoginToken([REDACTED])");
        assert_eq!(token.as_str(), "6d878daa1e17d282e1587312531af82f");
    }
}
