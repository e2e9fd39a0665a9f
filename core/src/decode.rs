//! Lenient, per-field decoding of API responses.
//!
//! # Design
//! Decoding is a pure, single-pass transformation from a parsed
//! `serde_json::Value` to owned records. Every field is looked up by name and
//! copied only when present with the expected JSON type; anything else leaves
//! the field at its zero state. This is deliberately not a validating decode:
//! the API evolves additively and a missing field must never fail an
//! otherwise successful call.
//!
//! List responses tolerate two shapes: an object carrying the collection
//! under its named field (`inboxes` / `messages`) plus pagination fields, or
//! a bare top-level array. The fallback is a deliberate hedge against
//! response-shape variation, not a convenience.

use serde_json::Value;

use crate::types::{Inbox, InboxList, Message, MessageList};

/// Copy a string field, or empty when absent/mistyped.
pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Copy a string field, or `None` when absent/mistyped.
fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Metadata may arrive as a JSON string or a nested object; an object is
/// re-serialized compactly so the record field is always flat text.
fn metadata_field(value: &Value) -> String {
    match value.get("metadata") {
        Some(Value::String(s)) => s.clone(),
        Some(object @ Value::Object(_)) => object.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn inbox_from_value(value: &Value) -> Inbox {
    Inbox {
        inbox_id: str_field(value, "inbox_id"),
        address: str_field(value, "address"),
        name: str_field(value, "name"),
        created_at: str_field(value, "created_at"),
        metadata: metadata_field(value),
    }
}

pub(crate) fn message_from_value(value: &Value) -> Message {
    Message {
        message_id: str_field(value, "message_id"),
        thread_id: str_field(value, "thread_id"),
        from: str_field(value, "from"),
        to: str_field(value, "to"),
        subject: str_field(value, "subject"),
        text: str_field(value, "text"),
        html: str_field(value, "html"),
        created_at: str_field(value, "created_at"),
        is_read: value
            .get("is_read")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        attachments: value
            .get("attachments")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// The collection under `key` when present and an array, otherwise the whole
/// value when it is itself an array.
fn collection<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
}

pub(crate) fn inbox_list_from_value(value: &Value) -> InboxList {
    InboxList {
        inboxes: collection(value, "inboxes")
            .map(|items| items.iter().map(inbox_from_value).collect())
            .unwrap_or_default(),
        next_cursor: opt_str_field(value, "next_page_token"),
    }
}

pub(crate) fn message_list_from_value(value: &Value) -> MessageList {
    MessageList {
        messages: collection(value, "messages")
            .map(|items| items.iter().map(message_from_value).collect())
            .unwrap_or_default(),
        next_cursor: opt_str_field(value, "next_page_token"),
        total: value.get("count").and_then(Value::as_u64),
    }
}
