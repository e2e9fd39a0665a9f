//! Synchronous client for the AgentMail REST API.
//!
//! # Overview
//! Wraps the AgentMail inbox-as-a-service API (inbox CRUD, message
//! send/list/read/delete, replies, raw MIME) behind plain-data requests and
//! responses and one blocking transport call per operation.
//!
//! # Design
//! - `AgentMailClient` holds an immutable `Config` and a `Transport`; it
//!   carries no other state between calls and provides no internal locking.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), with executing wrappers chaining
//!   the two around one round trip. Everything but the round trip is
//!   deterministic and testable without a network.
//! - Response bodies accumulate through `ResponseBuffer`, which doubles its
//!   capacity on demand up to a fixed 32 KiB ceiling and drops data beyond it
//!   rather than growing without bound.
//! - Record decoding is lenient and per-field: absent or mistyped JSON fields
//!   stay at their zero state, and no partial record is rejected.
//! - Types use owned `String` / `Vec` fields so values cross the C FFI
//!   boundary in `agentmail-ffi` without lifetime concerns.

pub mod buffer;
pub mod client;
mod decode;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use buffer::ResponseBuffer;
pub use client::{AgentMailClient, Config, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Inbox, InboxList, InboxOptions, Message, MessageList, MessageQuery, SendOptions};
