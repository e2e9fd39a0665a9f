//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer-plus-count instead of `Vec`,
//! and an error enum with the embedded client's numeric values. Conversion
//! functions live here to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Ownership rule: every non-null pointer inside an output struct is
//! individually heap-owned by this library and released by the matching
//! `agentmail_*_free` function, which also zeroes the struct so a second
//! free is a no-op.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr::null_mut;

use agentmail_core::{ApiError, Inbox, InboxList, Message, MessageList};

/// Opaque handle to a client. C callers receive a pointer to this from
/// `agentmail_init` and pass it back into every other function.
pub struct AgentmailClient {
    pub(crate) inner: agentmail_core::AgentMailClient,
    /// Opaque user pointer carried for the caller; never dereferenced.
    pub(crate) ctx: *mut c_void,
}

/// C error codes. `None` is success; every other value matches one
/// `ApiError` variant.
#[repr(C)]
pub enum AgentmailErr {
    None = 0,
    InvalidArg = -1,
    NoMem = -2,
    Http = -3,
    Auth = -4,
    Parse = -5,
    NotFound = -6,
    RateLimit = -7,
    Server = -8,
    Network = -9,
    Timeout = -10,
    Other = -11,
}

impl From<ApiError> for AgentmailErr {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidArg => AgentmailErr::InvalidArg,
            ApiError::NoMem => AgentmailErr::NoMem,
            ApiError::Http => AgentmailErr::Http,
            ApiError::Auth => AgentmailErr::Auth,
            ApiError::Parse => AgentmailErr::Parse,
            ApiError::NotFound => AgentmailErr::NotFound,
            ApiError::RateLimit => AgentmailErr::RateLimit,
            ApiError::Server => AgentmailErr::Server,
            ApiError::Network => AgentmailErr::Network,
            ApiError::Timeout => AgentmailErr::Timeout,
            ApiError::Other => AgentmailErr::Other,
        }
    }
}

/// Client configuration. Only `api_key` is required; null `base_url` and
/// non-positive `timeout_ms` select the defaults.
#[repr(C)]
pub struct AgentmailConfig {
    pub api_key: *const c_char,
    pub base_url: *const c_char,
    pub timeout_ms: c_int,
    pub enable_logging: bool,
    pub ctx: *mut c_void,
}

/// Inbox record. Fields the response omitted are null.
#[repr(C)]
pub struct AgentmailInbox {
    pub inbox_id: *mut c_char,
    pub address: *mut c_char,
    pub name: *mut c_char,
    pub created_at: *mut c_char,
    pub metadata: *mut c_char,
}

#[repr(C)]
pub struct AgentmailInboxList {
    pub inboxes: *mut AgentmailInbox,
    pub count: usize,
    /// Null when the server reported no further page.
    pub next_cursor: *mut c_char,
}

/// Message record. Fields the response omitted are null.
#[repr(C)]
pub struct AgentmailMessage {
    pub message_id: *mut c_char,
    pub thread_id: *mut c_char,
    pub from: *mut c_char,
    pub to: *mut c_char,
    pub subject: *mut c_char,
    pub text: *mut c_char,
    pub html: *mut c_char,
    pub created_at: *mut c_char,
    pub is_read: bool,
    pub attachments: *mut *mut c_char,
    pub attachment_count: usize,
}

#[repr(C)]
pub struct AgentmailMessageList {
    pub messages: *mut AgentmailMessage,
    pub count: usize,
    /// Null when the server reported no further page.
    pub next_cursor: *mut c_char,
    /// Total messages available when the server reported it, zero otherwise.
    pub total: usize,
}

/// Options for inbox create/update. Both fields may be null.
#[repr(C)]
pub struct AgentmailInboxOptions {
    pub name: *const c_char,
    /// JSON document in text form; silently omitted when unparseable.
    pub metadata: *const c_char,
}

/// Options for send/reply. `from` and `to` are required for a send; the
/// reply endpoint consults only `to`, `subject`, and the body fields.
#[repr(C)]
pub struct AgentmailSendOptions {
    pub from: *const c_char,
    pub to: *const c_char,
    pub subject: *const c_char,
    pub body_text: *const c_char,
    pub body_html: *const c_char,
    pub thread_id: *const c_char,
    pub reply_to: *const c_char,
    pub cc: *const *const c_char,
    pub cc_count: usize,
    pub bcc: *const *const c_char,
    pub bcc_count: usize,
}

/// Filters for listing messages. A null query selects the defaults.
#[repr(C)]
pub struct AgentmailMessageQuery {
    /// Non-positive selects the server default of 20.
    pub limit: c_int,
    pub cursor: *const c_char,
    pub unread_only: bool,
    pub thread_id: *const c_char,
}

impl AgentmailInbox {
    pub const fn empty() -> Self {
        Self {
            inbox_id: null_mut(),
            address: null_mut(),
            name: null_mut(),
            created_at: null_mut(),
            metadata: null_mut(),
        }
    }
}

impl AgentmailInboxList {
    pub const fn empty() -> Self {
        Self {
            inboxes: null_mut(),
            count: 0,
            next_cursor: null_mut(),
        }
    }
}

impl AgentmailMessage {
    pub const fn empty() -> Self {
        Self {
            message_id: null_mut(),
            thread_id: null_mut(),
            from: null_mut(),
            to: null_mut(),
            subject: null_mut(),
            text: null_mut(),
            html: null_mut(),
            created_at: null_mut(),
            is_read: false,
            attachments: null_mut(),
            attachment_count: 0,
        }
    }
}

impl AgentmailMessageList {
    pub const fn empty() -> Self {
        Self {
            messages: null_mut(),
            count: 0,
            next_cursor: null_mut(),
            total: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Empty strings become null pointers so C callers can null-check fields the
/// same way the JSON left them.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    if s.is_empty() {
        return null_mut();
    }
    CString::new(s).unwrap().into_raw()
}

/// Read a caller-supplied C string. Null maps to `None`; invalid UTF-8 maps
/// to an empty string rather than failing the call.
pub(crate) unsafe fn opt_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .unwrap_or("")
            .to_string(),
    )
}

/// Read a caller-supplied array of C strings; null entries are skipped.
pub(crate) unsafe fn string_array(ptr: *const *const c_char, count: usize) -> Vec<String> {
    if ptr.is_null() || count == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, count) }
        .iter()
        .filter_map(|entry| unsafe { opt_str(*entry) })
        .collect()
}

/// Move a `Vec` into a raw pointer-plus-count pair; empty becomes null.
/// Reconstructed for release via a boxed slice of exactly `count` elements.
fn into_raw_array<T>(items: Vec<T>) -> *mut T {
    if items.is_empty() {
        return null_mut();
    }
    Box::into_raw(items.into_boxed_slice()) as *mut T
}

pub(crate) fn inbox_into_ffi(inbox: Inbox) -> AgentmailInbox {
    AgentmailInbox {
        inbox_id: into_c_string(inbox.inbox_id),
        address: into_c_string(inbox.address),
        name: into_c_string(inbox.name),
        created_at: into_c_string(inbox.created_at),
        metadata: into_c_string(inbox.metadata),
    }
}

pub(crate) fn inbox_list_into_ffi(list: InboxList) -> AgentmailInboxList {
    let InboxList { inboxes, next_cursor } = list;
    let count = inboxes.len();
    let items: Vec<AgentmailInbox> = inboxes.into_iter().map(inbox_into_ffi).collect();
    AgentmailInboxList {
        inboxes: into_raw_array(items),
        count,
        next_cursor: next_cursor.map(into_c_string).unwrap_or(null_mut()),
    }
}

pub(crate) fn message_into_ffi(message: Message) -> AgentmailMessage {
    let Message {
        message_id,
        thread_id,
        from,
        to,
        subject,
        text,
        html,
        created_at,
        is_read,
        attachments,
    } = message;
    let attachment_count = attachments.len();
    let attachment_ptrs: Vec<*mut c_char> = attachments
        .into_iter()
        .map(|url| CString::new(url).unwrap().into_raw())
        .collect();
    AgentmailMessage {
        message_id: into_c_string(message_id),
        thread_id: into_c_string(thread_id),
        from: into_c_string(from),
        to: into_c_string(to),
        subject: into_c_string(subject),
        text: into_c_string(text),
        html: into_c_string(html),
        created_at: into_c_string(created_at),
        is_read,
        attachments: into_raw_array(attachment_ptrs),
        attachment_count,
    }
}

pub(crate) fn message_list_into_ffi(list: MessageList) -> AgentmailMessageList {
    let MessageList {
        messages,
        next_cursor,
        total,
    } = list;
    let count = messages.len();
    let items: Vec<AgentmailMessage> = messages.into_iter().map(message_into_ffi).collect();
    AgentmailMessageList {
        messages: into_raw_array(items),
        count,
        next_cursor: next_cursor.map(into_c_string).unwrap_or(null_mut()),
        total: total.unwrap_or(0) as usize,
    }
}
