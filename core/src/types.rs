//! Domain records and call options for the AgentMail API.
//!
//! # Design
//! Records are plain owned values populated by a lenient, per-field decode of
//! one JSON response: a field that is absent or of the wrong JSON type stays
//! at its zero state, and no partial record is ever rejected. Callers
//! empty-check the fields they care about. Option/input structs mirror the
//! request payloads the API accepts; optional members are skipped entirely
//! when unset so the wire JSON stays flat and minimal.

use serde::Serialize;

/// One inbox. String fields are empty when the response omitted them.
///
/// `metadata` holds the raw metadata value: a JSON string is copied verbatim,
/// a nested object is re-serialized compactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inbox {
    pub inbox_id: String,
    pub address: String,
    pub name: String,
    pub created_at: String,
    pub metadata: String,
}

/// One email message. String fields are empty when the response omitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub created_at: String,
    pub is_read: bool,
    pub attachments: Vec<String>,
}

/// One page of inboxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxList {
    pub inboxes: Vec<Inbox>,
    /// Cursor for the next page; `None` when the server reported no more.
    pub next_cursor: Option<String>,
}

/// One page of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    pub messages: Vec<Message>,
    /// Cursor for the next page; `None` when the server reported no more.
    pub next_cursor: Option<String>,
    /// Total messages available, when the server reported it.
    pub total: Option<u64>,
}

/// Options for creating or updating an inbox.
///
/// `metadata` is a JSON document in text form; it is parsed best-effort and
/// silently omitted from the payload when it does not parse.
#[derive(Debug, Clone, Default)]
pub struct InboxOptions {
    pub name: Option<String>,
    pub metadata: Option<String>,
}

/// Options for sending a message. `from` is the sending inbox id and `to`
/// the recipient; both are required for a send. For a reply only the
/// optional fields and `to` are consulted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendOptions {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
}

/// Filters for listing messages. A zero/unset limit falls back to the
/// server-side default of 20.
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    pub unread_only: bool,
    pub thread_id: Option<String>,
}
