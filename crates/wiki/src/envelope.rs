//! Decoding of the API's JSON reply envelopes.
//!
//! Every reply is a JSON object whose top-level key says how the rest of the
//! body must be read: `error`, `warnings`, `query`, `login`, `edit` or
//! `delete`. [`Envelope::decode`] inspects the keys once and yields a closed
//! set of variants, so each flow matches on a tagged union instead of probing
//! keys itself.
//!
//! Dates are never parsed: `serde_json` keeps them as strings, and they are
//! handed back to the server byte-for-byte (see [`PageInfo::base_timestamp`]).

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ProtocolFault;
use crate::types::EditOutcome;

/// Longest prefix of an unrecognized body kept for error messages.
const UNKNOWN_BODY_PREVIEW: usize = 200;

/// One decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{"error": {...}}`
    Error(ApiError),
    /// `{"warnings": {...}}` with no recognised payload beside it.
    Warnings(Warnings),
    /// `{"query": {...}}`, possibly accompanied by warnings.
    Query {
        query: QueryResult,
        warnings: Option<Warnings>,
    },
    /// `{"login": {...}}`
    Login(LoginResult),
    /// `{"edit": {...}}`
    Edit(EditResult),
    /// `{"delete": {...}}`
    Delete(DeleteResult),
    /// Valid JSON with none of the known keys. Holds a preview of the body.
    Unknown(String),
}

impl Envelope {
    /// Decodes a raw reply body.
    ///
    /// Precedence when several keys are present: `error`, `query`, `login`,
    /// `edit`, `delete`, then a bare `warnings`.
    pub fn decode(body: &str) -> Result<Self, ProtocolFault> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ProtocolFault::Malformed(e.to_string()))?;

        let Value::Object(mut root) = value else {
            return Ok(Envelope::Unknown(preview(body)));
        };

        if let Some(error) = root.remove("error") {
            return section(error, "error").map(Envelope::Error);
        }

        let warnings: Option<Warnings> = root
            .remove("warnings")
            .map(|w| section(w, "warnings"))
            .transpose()?;

        if let Some(query) = root.remove("query") {
            return Ok(Envelope::Query {
                query: section(query, "query")?,
                warnings,
            });
        }

        let payload = take_payload(&mut root)?;
        match (payload, warnings) {
            (Some(envelope), Some(warnings)) => {
                warn!(warnings = %warnings, "ignoring warnings returned alongside the reply");
                Ok(envelope)
            }
            (Some(envelope), None) => Ok(envelope),
            (None, Some(warnings)) => Ok(Envelope::Warnings(warnings)),
            (None, None) => Ok(Envelope::Unknown(preview(body))),
        }
    }

    /// Name of the top-level key this envelope was decoded from.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Error(_) => "error",
            Envelope::Warnings(_) => "warnings",
            Envelope::Query { .. } => "query",
            Envelope::Login(_) => "login",
            Envelope::Edit(_) => "edit",
            Envelope::Delete(_) => "delete",
            Envelope::Unknown(_) => "unknown",
        }
    }
}

fn take_payload(root: &mut Map<String, Value>) -> Result<Option<Envelope>, ProtocolFault> {
    if let Some(login) = root.remove("login") {
        return section(login, "login").map(|l| Some(Envelope::Login(l)));
    }
    if let Some(edit) = root.remove("edit") {
        return section(edit, "edit").map(|e| Some(Envelope::Edit(e)));
    }
    if let Some(delete) = root.remove("delete") {
        return section(delete, "delete").map(|d| Some(Envelope::Delete(d)));
    }
    Ok(None)
}

fn section<T: DeserializeOwned>(value: Value, name: &'static str) -> Result<T, ProtocolFault> {
    serde_json::from_value(value).map_err(|e| ProtocolFault::Malformed(format!("{name}: {e}")))
}

fn preview(body: &str) -> String {
    body.chars().take(UNKNOWN_BODY_PREVIEW).collect()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Deserializes a presence flag: the key existing at all (usually with the
/// value `""`) means `true`. Pair with `#[serde(default)]` for absence.
fn presence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

/// Accepts a JSON number or string and yields its string form.
fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Deserializes an informational field, falling back to its default when the
/// value has an unexpected type or is `null`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// error / warnings
// ---------------------------------------------------------------------------

/// `error` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl From<ApiError> for ProtocolFault {
    fn from(error: ApiError) -> Self {
        ProtocolFault::Remote {
            code: error.code,
            info: error.info,
        }
    }
}

/// `warnings` section: one message per API module that raised a warning.
///
/// Accepts both `{"info": {"*": "text"}}` and `{"info": "text"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Warnings {
    messages: BTreeMap<String, String>,
}

impl From<BTreeMap<String, Value>> for Warnings {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let messages = raw
            .into_iter()
            .map(|(module, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Object(mut obj) => match obj.remove("*") {
                        Some(Value::String(s)) => s,
                        Some(other) => other.to_string(),
                        None => Value::Object(obj).to_string(),
                    },
                    other => other.to_string(),
                };
                (module, text)
            })
            .collect();
        Self { messages }
    }
}

impl Warnings {
    /// Message raised by the `info` module, if any.
    pub fn info(&self) -> Option<&str> {
        self.messages.get("info").map(String::as_str)
    }
}

impl std::fmt::Display for Warnings {
    /// Prefers the `info` message; otherwise lists every module's message.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(info) = self.info() {
            return f.write_str(info);
        }
        let joined = self
            .messages
            .iter()
            .map(|(module, text)| format!("{module}: {text}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

/// `query` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResult {
    /// Page-info entries keyed by page id; the key is negative for pages that
    /// do not exist.
    #[serde(default)]
    pub pages: BTreeMap<String, PageInfo>,
}

impl QueryResult {
    /// The page-info entry of a single-title query.
    pub fn single_page(&self) -> Option<&PageInfo> {
        self.pages.values().next()
    }
}

/// One entry of `query.pages`.
///
/// Only `missing` is read unconditionally. Every other field tolerates a
/// `null` or an unexpected type by falling back to "absent", so an entry for a
/// nonexistent page is recognised whatever else the server puts beside it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub pageid: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// The page does not exist.
    #[serde(default, deserialize_with = "presence")]
    pub missing: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub edittoken: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub deletetoken: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub touched: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub starttimestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub revisions: Vec<Revision>,
}

impl PageInfo {
    /// Anchor for optimistic concurrency: `touched` if present, else
    /// `starttimestamp`. Returned exactly as received.
    pub fn base_timestamp(&self) -> Option<&str> {
        self.touched
            .as_deref()
            .or(self.starttimestamp.as_deref())
    }

    /// Raw content of the first listed revision.
    pub fn first_revision_content(&self) -> Option<&str> {
        self.revisions.first().and_then(|r| r.content.as_deref())
    }
}

/// One entry of `revisions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub revid: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Wiki markup of the revision, unmodified.
    #[serde(rename = "*", default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

/// `login` section, covering both handshake phases.
///
/// Phase 1 (`NeedToken`) fills `token`; phase 2 (`Success`) fills the `lg*`
/// identity fields. `cookieprefix` and `sessionid` appear in both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResult {
    pub result: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub lguserid: Option<String>,
    #[serde(default)]
    pub lgusername: Option<String>,
    #[serde(default)]
    pub lgtoken: Option<String>,
    #[serde(default)]
    pub cookieprefix: Option<String>,
    #[serde(default)]
    pub sessionid: Option<String>,
}

// ---------------------------------------------------------------------------
// edit / delete
// ---------------------------------------------------------------------------

/// `edit` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditResult {
    pub result: String,
    /// The edit created the page.
    #[serde(default, deserialize_with = "presence")]
    pub new: bool,
    /// The submitted text was identical to the current revision.
    #[serde(default, deserialize_with = "presence")]
    pub nochange: bool,
    #[serde(default)]
    pub pageid: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub oldrevid: Option<u64>,
    #[serde(default)]
    pub newrevid: Option<u64>,
}

impl EditResult {
    /// Classifies a successful edit. `new` is checked before `nochange`.
    pub fn outcome(&self) -> EditOutcome {
        if self.new {
            EditOutcome::PageAdded
        } else if self.nochange {
            EditOutcome::NoChange
        } else {
            EditOutcome::PageUpdated
        }
    }
}

/// `delete` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reason: String,
}
