//! Request building, orchestration, and response parsing for the AgentMail API.
//!
//! # Design
//! `AgentMailClient` holds an immutable [`Config`] and one [`Transport`] and
//! carries no other state between calls. Each operation is split into a
//! `build_*` method that produces an [`HttpRequest`] and a `parse_*` method
//! that consumes an [`HttpResponse`]; a thin executing wrapper chains
//! build, one blocking round trip, and parse. The split keeps everything but
//! the round trip itself deterministic and testable without a network.
//!
//! Every request carries the same three headers (bearer authorization, JSON
//! content type, fixed user agent). Paths are assembled by plain
//! concatenation; callers are responsible for escaping any identifier that
//! needs it.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::decode;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Inbox, InboxList, InboxOptions, Message, MessageList, MessageQuery, SendOptions};

/// Endpoint used when the configuration leaves `base_url` empty.
pub const DEFAULT_BASE_URL: &str = "https://api.agentmail.to/v0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "agentmail-rust/0.1";
const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Bodies longer than this are truncated (requests) or skipped (responses)
/// in diagnostic log output.
const LOG_BODY_MAX: usize = 1024;

/// Client configuration. Built once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// API credential; must be non-empty.
    pub api_key: String,
    /// Base endpoint URL; empty selects [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Deadline for one whole round trip.
    pub timeout: Duration,
    /// Emit diagnostic log lines for each request and response.
    pub log_requests: bool,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            log_requests: true,
        }
    }
}

/// Synchronous client for the AgentMail API.
///
/// One client may serve any number of sequential requests. No internal
/// locking is provided; sharing a client across threads is only as safe as
/// the transport, and concurrent calls carry no ordering guarantee.
pub struct AgentMailClient {
    config: Config,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for AgentMailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentMailClient")
            .field("config", &self.config)
            .field("transport", &"<dyn Transport>")
            .finish()
    }
}

impl AgentMailClient {
    /// Build a client over the default `ureq` transport.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Box::new(transport))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(
        mut config: Config,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ApiError> {
        if config.api_key.is_empty() {
            return Err(ApiError::InvalidArg);
        }
        if config.base_url.is_empty() {
            config.base_url = DEFAULT_BASE_URL.to_string();
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Inbox operations
    // -----------------------------------------------------------------------

    /// Create a new inbox.
    pub fn inbox_create(&self, options: &InboxOptions) -> Result<Inbox, ApiError> {
        let request = self.build_inbox_create(options)?;
        let response = self.perform(request)?;
        self.parse_inbox(response)
    }

    /// Fetch one inbox by id.
    pub fn inbox_get(&self, inbox_id: &str) -> Result<Inbox, ApiError> {
        let request = self.build_inbox_get(inbox_id)?;
        let response = self.perform(request)?;
        self.parse_inbox(response)
    }

    /// List inboxes with optional pagination.
    pub fn inbox_list(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<InboxList, ApiError> {
        let request = self.build_inbox_list(limit, cursor);
        let response = self.perform(request)?;
        self.parse_inbox_list(response)
    }

    /// Update an inbox's name and/or metadata.
    pub fn inbox_update(&self, inbox_id: &str, options: &InboxOptions) -> Result<(), ApiError> {
        let request = self.build_inbox_update(inbox_id, options)?;
        let response = self.perform(request)?;
        self.parse_ack(response)
    }

    /// Permanently delete an inbox and all its messages.
    pub fn inbox_delete(&self, inbox_id: &str) -> Result<(), ApiError> {
        let request = self.build_inbox_delete(inbox_id)?;
        let response = self.perform(request)?;
        self.parse_ack(response)
    }

    // -----------------------------------------------------------------------
    // Message operations
    // -----------------------------------------------------------------------

    /// Send a message from `options.from`; returns the new message id
    /// (empty when the response omitted it).
    pub fn send(&self, options: &SendOptions) -> Result<String, ApiError> {
        let request = self.build_send(options)?;
        let response = self.perform(request)?;
        self.parse_message_id(response)
    }

    /// List an inbox's messages with filtering and pagination.
    pub fn messages_list(&self, inbox_id: &str, query: &MessageQuery) -> Result<MessageList, ApiError> {
        let request = self.build_messages_list(inbox_id, query)?;
        let response = self.perform(request)?;
        self.parse_message_list(response)
    }

    /// Fetch one message by id.
    pub fn message_get(&self, inbox_id: &str, message_id: &str) -> Result<Message, ApiError> {
        let request = self.build_message_get(inbox_id, message_id)?;
        let response = self.perform(request)?;
        self.parse_message(response)
    }

    /// Set a message's read flag.
    pub fn message_mark_read(
        &self,
        inbox_id: &str,
        message_id: &str,
        is_read: bool,
    ) -> Result<(), ApiError> {
        let request = self.build_message_mark_read(inbox_id, message_id, is_read)?;
        let response = self.perform(request)?;
        self.parse_ack(response)
    }

    /// Delete one message.
    pub fn message_delete(&self, inbox_id: &str, message_id: &str) -> Result<(), ApiError> {
        let request = self.build_message_delete(inbox_id, message_id)?;
        let response = self.perform(request)?;
        self.parse_ack(response)
    }

    /// Reply within a message's thread; returns the reply's message id
    /// (empty when the response omitted it).
    pub fn send_reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        options: &SendOptions,
    ) -> Result<String, ApiError> {
        let request = self.build_send_reply(inbox_id, message_id, options)?;
        let response = self.perform(request)?;
        self.parse_message_id(response)
    }

    /// Fetch a message's raw MIME content verbatim.
    pub fn message_get_raw(&self, inbox_id: &str, message_id: &str) -> Result<String, ApiError> {
        let request = self.build_message_get_raw(inbox_id, message_id)?;
        let response = self.perform(request)?;
        self.parse_raw(response)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_inbox_create(&self, options: &InboxOptions) -> Result<HttpRequest, ApiError> {
        let body = to_json(&InboxPayload::from_options(options))?;
        Ok(self.request(HttpMethod::Post, "/inboxes".to_string(), Some(body)))
    }

    pub fn build_inbox_get(&self, inbox_id: &str) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        Ok(self.request(HttpMethod::Get, format!("/inboxes/{inbox_id}"), None))
    }

    pub fn build_inbox_list(&self, limit: Option<u32>, cursor: Option<&str>) -> HttpRequest {
        let mut path = format!("/inboxes?limit={}", effective_limit(limit));
        if let Some(cursor) = cursor {
            path.push_str("&cursor=");
            path.push_str(cursor);
        }
        self.request(HttpMethod::Get, path, None)
    }

    pub fn build_inbox_update(
        &self,
        inbox_id: &str,
        options: &InboxOptions,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        let body = to_json(&InboxPayload::from_options(options))?;
        Ok(self.request(HttpMethod::Patch, format!("/inboxes/{inbox_id}"), Some(body)))
    }

    pub fn build_inbox_delete(&self, inbox_id: &str) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        Ok(self.request(HttpMethod::Delete, format!("/inboxes/{inbox_id}"), None))
    }

    pub fn build_send(&self, options: &SendOptions) -> Result<HttpRequest, ApiError> {
        require(&options.from)?;
        require(&options.to)?;
        let body = to_json(options)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("/inboxes/{}/messages/send", options.from),
            Some(body),
        ))
    }

    pub fn build_messages_list(
        &self,
        inbox_id: &str,
        query: &MessageQuery,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        let mut path = format!(
            "/inboxes/{inbox_id}/messages?limit={}",
            effective_limit(query.limit)
        );
        if let Some(cursor) = &query.cursor {
            path.push_str("&cursor=");
            path.push_str(cursor);
        }
        if query.unread_only {
            path.push_str("&unread=true");
        }
        if let Some(thread_id) = &query.thread_id {
            path.push_str("&thread_id=");
            path.push_str(thread_id);
        }
        Ok(self.request(HttpMethod::Get, path, None))
    }

    pub fn build_message_get(&self, inbox_id: &str, message_id: &str) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        require(message_id)?;
        Ok(self.request(
            HttpMethod::Get,
            format!("/inboxes/{inbox_id}/messages/{message_id}"),
            None,
        ))
    }

    /// PATCH per the observed v0 behavior; the API has not confirmed whether
    /// PUT is also accepted.
    pub fn build_message_mark_read(
        &self,
        inbox_id: &str,
        message_id: &str,
        is_read: bool,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        require(message_id)?;
        let body = to_json(&ReadFlagPayload { is_read })?;
        Ok(self.request(
            HttpMethod::Patch,
            format!("/inboxes/{inbox_id}/messages/{message_id}"),
            Some(body),
        ))
    }

    pub fn build_message_delete(
        &self,
        inbox_id: &str,
        message_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        require(message_id)?;
        Ok(self.request(
            HttpMethod::Delete,
            format!("/inboxes/{inbox_id}/messages/{message_id}"),
            None,
        ))
    }

    pub fn build_send_reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        options: &SendOptions,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        require(message_id)?;
        let payload = ReplyPayload {
            to: non_empty(&options.to),
            subject: options.subject.as_deref(),
            text: options.body_text.as_deref(),
            html: options.body_html.as_deref(),
        };
        let body = to_json(&payload)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("/inboxes/{inbox_id}/messages/{message_id}/reply"),
            Some(body),
        ))
    }

    pub fn build_message_get_raw(
        &self,
        inbox_id: &str,
        message_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        require(inbox_id)?;
        require(message_id)?;
        Ok(self.request(
            HttpMethod::Get,
            format!("/inboxes/{inbox_id}/messages/{message_id}/raw"),
            None,
        ))
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_inbox(&self, response: HttpResponse) -> Result<Inbox, ApiError> {
        ApiError::from_status(response.status)?;
        let value: Value = serde_json::from_str(&response.body).map_err(|_| ApiError::Parse)?;
        Ok(decode::inbox_from_value(&value))
    }

    pub fn parse_inbox_list(&self, response: HttpResponse) -> Result<InboxList, ApiError> {
        ApiError::from_status(response.status)?;
        let value: Value = serde_json::from_str(&response.body).map_err(|_| ApiError::Parse)?;
        Ok(decode::inbox_list_from_value(&value))
    }

    pub fn parse_message(&self, response: HttpResponse) -> Result<Message, ApiError> {
        ApiError::from_status(response.status)?;
        let value: Value = serde_json::from_str(&response.body).map_err(|_| ApiError::Parse)?;
        Ok(decode::message_from_value(&value))
    }

    pub fn parse_message_list(&self, response: HttpResponse) -> Result<MessageList, ApiError> {
        ApiError::from_status(response.status)?;
        let value: Value = serde_json::from_str(&response.body).map_err(|_| ApiError::Parse)?;
        Ok(decode::message_list_from_value(&value))
    }

    /// Send/reply responses are decoded best-effort: an unparseable body is
    /// not an error, it just leaves the id empty.
    pub fn parse_message_id(&self, response: HttpResponse) -> Result<String, ApiError> {
        ApiError::from_status(response.status)?;
        Ok(serde_json::from_str::<Value>(&response.body)
            .map(|value| decode::str_field(&value, "message_id"))
            .unwrap_or_default())
    }

    /// For operations whose response body is not consumed.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<(), ApiError> {
        ApiError::from_status(response.status)
    }

    /// The raw MIME endpoint returns the body verbatim, no JSON involved.
    pub fn parse_raw(&self, response: HttpResponse) -> Result<String, ApiError> {
        ApiError::from_status(response.status)?;
        Ok(response.body)
    }

    // -----------------------------------------------------------------------
    // Orchestration
    // -----------------------------------------------------------------------

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{}", self.config.base_url, path),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
            ],
            body,
        }
    }

    /// One blocking round trip plus optional diagnostics. Status
    /// classification happens in the `parse_*` methods so fabricated
    /// responses go through the identical path in tests.
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.config.log_requests {
            debug!(method = request.method.as_str(), url = %request.path, "request");
            if let Some(body) = &request.body {
                debug!(body = truncated(body), "request body");
            }
        }
        let response = self.transport.execute(&request)?;
        if self.config.log_requests {
            debug!(status = response.status, size = response.body.len(), "response");
            if !response.body.is_empty() && response.body.len() < LOG_BODY_MAX {
                debug!(body = %response.body, "response body");
            }
        }
        Ok(response)
    }
}

fn require(arg: &str) -> Result<(), ApiError> {
    if arg.is_empty() {
        Err(ApiError::InvalidArg)
    } else {
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn effective_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(l) if l > 0 => l,
        _ => DEFAULT_PAGE_LIMIT,
    }
}

fn to_json<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|_| ApiError::Parse)
}

fn truncated(text: &str) -> &str {
    if text.len() <= LOG_BODY_MAX {
        return text;
    }
    let mut end = LOG_BODY_MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Wire payload for inbox create/update.
#[derive(Serialize)]
struct InboxPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

impl<'a> InboxPayload<'a> {
    fn from_options(options: &'a InboxOptions) -> Self {
        Self {
            name: options.name.as_deref(),
            // Unparseable metadata is silently omitted rather than rejected.
            metadata: options
                .metadata
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
        }
    }
}

/// Wire payload for the reply endpoint, which takes `text`/`html` keys
/// rather than the send endpoint's `body_text`/`body_html`.
#[derive(Serialize)]
struct ReplyPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[derive(Serialize)]
struct ReadFlagPayload {
    is_read: bool,
}
