//! C-ABI wrapper around `agentmail-core`.
//!
//! # Overview
//! Exposes the full AgentMail client through `extern "C"` functions so any
//! language with a C FFI can create inboxes, send and read mail, and release
//! the returned records without linking against Rust directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary; a caught panic reports `Other`.
//! - Results arrive through caller-supplied out-parameters; the return value
//!   is always an `AgentmailErr` code. Out-parameters are zeroed before the
//!   call so a failed call never leaves stale pointers behind.
//! - The caller owns every non-null pointer written into an out-parameter
//!   and must release it with the matching `agentmail_*_free` function.
//!   Free functions zero the record after releasing its fields, so freeing
//!   twice is a no-op, and all of them accept null.
//! - Null/invalid caller input returns `InvalidArg` before any network
//!   activity.

pub mod types;

use std::ffi::{c_char, c_void, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr::null_mut;
use std::time::Duration;

use agentmail_core::{Config, InboxOptions, MessageQuery, SendOptions};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client from `config` and write its handle to `out_handle`.
///
/// `config->api_key` must be a non-empty string. The handle must be released
/// with `agentmail_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_init(
    config: *const AgentmailConfig,
    out_handle: *mut *mut AgentmailClient,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if config.is_null() || out_handle.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_handle.write(null_mut()) };
        let config_ref = unsafe { &*config };
        let api_key = match unsafe { opt_str(config_ref.api_key) } {
            Some(key) if !key.is_empty() => key,
            _ => return AgentmailErr::InvalidArg,
        };

        let mut core_config = Config::new(api_key);
        if let Some(base_url) = unsafe { opt_str(config_ref.base_url) } {
            core_config.base_url = base_url;
        }
        if config_ref.timeout_ms > 0 {
            core_config.timeout = Duration::from_millis(config_ref.timeout_ms as u64);
        }
        core_config.log_requests = config_ref.enable_logging;

        match agentmail_core::AgentMailClient::new(core_config) {
            Ok(client) => {
                let handle = Box::new(AgentmailClient {
                    inner: client,
                    ctx: config_ref.ctx,
                });
                unsafe { out_handle.write(Box::into_raw(handle)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Destroy a client created by `agentmail_init`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_destroy(handle: *mut AgentmailClient) -> AgentmailErr {
    if handle.is_null() {
        return AgentmailErr::InvalidArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        drop(unsafe { Box::from_raw(handle) });
        AgentmailErr::None
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// The opaque user pointer supplied at init time, or null.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_get_ctx(handle: *const AgentmailClient) -> *mut c_void {
    if handle.is_null() {
        return null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { (*handle).ctx })).unwrap_or(null_mut())
}

// ---------------------------------------------------------------------------
// Inbox operations
// ---------------------------------------------------------------------------

/// Create a new inbox. `options` may be null for defaults. On success the
/// caller must release `out_inbox` with `agentmail_inbox_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_create(
    handle: *const AgentmailClient,
    options: *const AgentmailInboxOptions,
    out_inbox: *mut AgentmailInbox,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || out_inbox.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_inbox.write(AgentmailInbox::empty()) };
        let client = unsafe { &*handle };
        let core_options = unsafe { inbox_options_from_ffi(options) };
        match client.inner.inbox_create(&core_options) {
            Ok(inbox) => {
                unsafe { out_inbox.write(inbox_into_ffi(inbox)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Fetch one inbox by id. On success the caller must release `out_inbox`
/// with `agentmail_inbox_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_get(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    out_inbox: *mut AgentmailInbox,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || out_inbox.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_inbox.write(AgentmailInbox::empty()) };
        let client = unsafe { &*handle };
        let id = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        match client.inner.inbox_get(&id) {
            Ok(inbox) => {
                unsafe { out_inbox.write(inbox_into_ffi(inbox)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// List inboxes. Non-positive `limit` selects the server default of 20;
/// `cursor` may be null for the first page. On success the caller must
/// release `out_list` with `agentmail_inbox_list_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_list(
    handle: *const AgentmailClient,
    limit: i32,
    cursor: *const c_char,
    out_list: *mut AgentmailInboxList,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || out_list.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_list.write(AgentmailInboxList::empty()) };
        let client = unsafe { &*handle };
        let limit = (limit > 0).then_some(limit as u32);
        let cursor = unsafe { opt_str(cursor) };
        match client.inner.inbox_list(limit, cursor.as_deref()) {
            Ok(list) => {
                unsafe { out_list.write(inbox_list_into_ffi(list)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Update an inbox's name and/or metadata. `options` may be null, which
/// sends an empty update.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_update(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    options: *const AgentmailInboxOptions,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() {
            return AgentmailErr::InvalidArg;
        }
        let client = unsafe { &*handle };
        let id = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let core_options = unsafe { inbox_options_from_ffi(options) };
        match client.inner.inbox_update(&id, &core_options) {
            Ok(()) => AgentmailErr::None,
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Permanently delete an inbox and all its messages.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_delete(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() {
            return AgentmailErr::InvalidArg;
        }
        let client = unsafe { &*handle };
        let id = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        match client.inner.inbox_delete(&id) {
            Ok(()) => AgentmailErr::None,
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

// ---------------------------------------------------------------------------
// Message operations
// ---------------------------------------------------------------------------

/// Send a message from `options->from`. When `out_message_id` is non-null it
/// receives the new message id (or null if the response omitted it); release
/// it with `agentmail_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_send(
    handle: *const AgentmailClient,
    options: *const AgentmailSendOptions,
    out_message_id: *mut *mut c_char,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || options.is_null() {
            return AgentmailErr::InvalidArg;
        }
        if !out_message_id.is_null() {
            unsafe { out_message_id.write(null_mut()) };
        }
        let client = unsafe { &*handle };
        let core_options = unsafe { send_options_from_ffi(&*options) };
        match client.inner.send(&core_options) {
            Ok(message_id) => {
                if !out_message_id.is_null() {
                    unsafe { out_message_id.write(into_c_string(message_id)) };
                }
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// List an inbox's messages. `query` may be null for the defaults. On
/// success the caller must release `out_list` with
/// `agentmail_message_list_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_messages_list(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    query: *const AgentmailMessageQuery,
    out_list: *mut AgentmailMessageList,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || out_list.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_list.write(AgentmailMessageList::empty()) };
        let client = unsafe { &*handle };
        let id = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let core_query = unsafe { message_query_from_ffi(query) };
        match client.inner.messages_list(&id, &core_query) {
            Ok(list) => {
                unsafe { out_list.write(message_list_into_ffi(list)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Fetch one message by id. On success the caller must release
/// `out_message` with `agentmail_message_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_get(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    message_id: *const c_char,
    out_message: *mut AgentmailMessage,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || message_id.is_null() || out_message.is_null() {
            return AgentmailErr::InvalidArg;
        }
        unsafe { out_message.write(AgentmailMessage::empty()) };
        let client = unsafe { &*handle };
        let inbox = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let message = unsafe { opt_str(message_id) }.unwrap_or_default();
        match client.inner.message_get(&inbox, &message) {
            Ok(record) => {
                unsafe { out_message.write(message_into_ffi(record)) };
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Set a message's read flag.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_mark_read(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    message_id: *const c_char,
    is_read: bool,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || message_id.is_null() {
            return AgentmailErr::InvalidArg;
        }
        let client = unsafe { &*handle };
        let inbox = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let message = unsafe { opt_str(message_id) }.unwrap_or_default();
        match client.inner.message_mark_read(&inbox, &message, is_read) {
            Ok(()) => AgentmailErr::None,
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Delete one message.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_delete(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    message_id: *const c_char,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || message_id.is_null() {
            return AgentmailErr::InvalidArg;
        }
        let client = unsafe { &*handle };
        let inbox = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let message = unsafe { opt_str(message_id) }.unwrap_or_default();
        match client.inner.message_delete(&inbox, &message) {
            Ok(()) => AgentmailErr::None,
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Reply within a message's thread. When `out_message_id` is non-null it
/// receives the reply's message id; release it with
/// `agentmail_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_send_reply(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    message_id: *const c_char,
    options: *const AgentmailSendOptions,
    out_message_id: *mut *mut c_char,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || inbox_id.is_null() || message_id.is_null() || options.is_null() {
            return AgentmailErr::InvalidArg;
        }
        if !out_message_id.is_null() {
            unsafe { out_message_id.write(null_mut()) };
        }
        let client = unsafe { &*handle };
        let inbox = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let message = unsafe { opt_str(message_id) }.unwrap_or_default();
        let core_options = unsafe { send_options_from_ffi(&*options) };
        match client.inner.send_reply(&inbox, &message, &core_options) {
            Ok(reply_id) => {
                if !out_message_id.is_null() {
                    unsafe { out_message_id.write(into_c_string(reply_id)) };
                }
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

/// Fetch a message's raw MIME content. On success `out_raw` receives an
/// owned C string (release with `agentmail_string_free`) and `out_size` its
/// length in bytes, excluding the terminator.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_get_raw(
    handle: *const AgentmailClient,
    inbox_id: *const c_char,
    message_id: *const c_char,
    out_raw: *mut *mut c_char,
    out_size: *mut usize,
) -> AgentmailErr {
    catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null()
            || inbox_id.is_null()
            || message_id.is_null()
            || out_raw.is_null()
            || out_size.is_null()
        {
            return AgentmailErr::InvalidArg;
        }
        unsafe {
            out_raw.write(null_mut());
            out_size.write(0);
        }
        let client = unsafe { &*handle };
        let inbox = unsafe { opt_str(inbox_id) }.unwrap_or_default();
        let message = unsafe { opt_str(message_id) }.unwrap_or_default();
        match client.inner.message_get_raw(&inbox, &message) {
            Ok(raw) => {
                let size = raw.len();
                unsafe {
                    out_raw.write(CString::new(raw).unwrap().into_raw());
                    out_size.write(size);
                }
                AgentmailErr::None
            }
            Err(err) => err.into(),
        }
    }))
    .unwrap_or(AgentmailErr::Other)
}

// ---------------------------------------------------------------------------
// Input conversions
// ---------------------------------------------------------------------------

unsafe fn inbox_options_from_ffi(options: *const AgentmailInboxOptions) -> InboxOptions {
    if options.is_null() {
        return InboxOptions::default();
    }
    let options = unsafe { &*options };
    InboxOptions {
        name: unsafe { opt_str(options.name) },
        metadata: unsafe { opt_str(options.metadata) },
    }
}

unsafe fn send_options_from_ffi(options: &AgentmailSendOptions) -> SendOptions {
    SendOptions {
        from: unsafe { opt_str(options.from) }.unwrap_or_default(),
        to: unsafe { opt_str(options.to) }.unwrap_or_default(),
        subject: unsafe { opt_str(options.subject) },
        body_text: unsafe { opt_str(options.body_text) },
        body_html: unsafe { opt_str(options.body_html) },
        thread_id: unsafe { opt_str(options.thread_id) },
        reply_to: unsafe { opt_str(options.reply_to) },
        cc: unsafe { string_array(options.cc, options.cc_count) },
        bcc: unsafe { string_array(options.bcc, options.bcc_count) },
    }
}

unsafe fn message_query_from_ffi(query: *const AgentmailMessageQuery) -> MessageQuery {
    if query.is_null() {
        return MessageQuery::default();
    }
    let query = unsafe { &*query };
    MessageQuery {
        limit: (query.limit > 0).then_some(query.limit as u32),
        cursor: unsafe { opt_str(query.cursor) },
        unread_only: query.unread_only,
        thread_id: unsafe { opt_str(query.thread_id) },
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

unsafe fn free_inbox_fields(inbox: &mut AgentmailInbox) {
    unsafe {
        free_c_string(inbox.inbox_id);
        free_c_string(inbox.address);
        free_c_string(inbox.name);
        free_c_string(inbox.created_at);
        free_c_string(inbox.metadata);
    }
    *inbox = AgentmailInbox::empty();
}

unsafe fn free_message_fields(message: &mut AgentmailMessage) {
    unsafe {
        free_c_string(message.message_id);
        free_c_string(message.thread_id);
        free_c_string(message.from);
        free_c_string(message.to);
        free_c_string(message.subject);
        free_c_string(message.text);
        free_c_string(message.html);
        free_c_string(message.created_at);
        if !message.attachments.is_null() && message.attachment_count > 0 {
            let urls = Box::from_raw(std::slice::from_raw_parts_mut(
                message.attachments,
                message.attachment_count,
            ));
            for url in urls.iter() {
                free_c_string(*url);
            }
        }
    }
    *message = AgentmailMessage::empty();
}

/// Release an inbox record's fields and zero it. Safe to call with null and
/// safe to call twice.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_free(inbox: *mut AgentmailInbox) {
    if inbox.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe {
        free_inbox_fields(&mut *inbox);
    });
}

/// Release an inbox list, its records, and its cursor, then zero it. Safe to
/// call with null and safe to call twice.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_inbox_list_free(list: *mut AgentmailInboxList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe {
        let list = &mut *list;
        if !list.inboxes.is_null() && list.count > 0 {
            let mut items =
                Box::from_raw(std::slice::from_raw_parts_mut(list.inboxes, list.count));
            for item in items.iter_mut() {
                free_inbox_fields(item);
            }
        }
        free_c_string(list.next_cursor);
        *list = AgentmailInboxList::empty();
    });
}

/// Release a message record's fields and zero it. Safe to call with null and
/// safe to call twice.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_free(message: *mut AgentmailMessage) {
    if message.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe {
        free_message_fields(&mut *message);
    });
}

/// Release a message list, its records, and its cursor, then zero it. Safe
/// to call with null and safe to call twice.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_message_list_free(list: *mut AgentmailMessageList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe {
        let list = &mut *list;
        if !list.messages.is_null() && list.count > 0 {
            let mut items =
                Box::from_raw(std::slice::from_raw_parts_mut(list.messages, list.count));
            for item in items.iter_mut() {
                free_message_fields(item);
            }
        }
        free_c_string(list.next_cursor);
        *list = AgentmailMessageList::empty();
    });
}

/// Release a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe {
            drop(CString::from_raw(s));
        });
    }
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Fixed description for an error code. Always returns a valid static
/// string, including for out-of-range values from C.
#[unsafe(no_mangle)]
pub extern "C" fn agentmail_err_to_str(err: AgentmailErr) -> *const c_char {
    let text = match err {
        AgentmailErr::None => c"No error",
        AgentmailErr::InvalidArg => c"Invalid argument",
        AgentmailErr::NoMem => c"Out of memory",
        AgentmailErr::Http => c"HTTP client error",
        AgentmailErr::Auth => c"Authentication failed (401/403)",
        AgentmailErr::Parse => c"JSON parse error",
        AgentmailErr::NotFound => c"Resource not found (404)",
        AgentmailErr::RateLimit => c"Rate limit exceeded (429)",
        AgentmailErr::Server => c"Server error (5xx)",
        AgentmailErr::Network => c"Network error",
        AgentmailErr::Timeout => c"Request timeout",
        AgentmailErr::Other => c"Unknown error",
    };
    text.as_ptr()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
