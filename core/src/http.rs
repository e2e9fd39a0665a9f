//! HTTP request/response values exchanged with the transport.
//!
//! # Design
//! Requests and responses are plain owned data. `AgentMailClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; the `Transport` implementation in between is the only code that
//! performs I/O. The split keeps request construction and response parsing
//! deterministic and unit-testable, and the owned fields (`String`, `Vec`)
//! cross the C FFI boundary without lifetime concerns.

/// HTTP method for a request. Only the methods the AgentMail API consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the full URL (base URL plus endpoint path and query string).
/// Headers always include authorization, content type, and user agent, set by
/// the client that built the request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after one round trip, then handed to a
/// `parse_*` method for status classification and decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
