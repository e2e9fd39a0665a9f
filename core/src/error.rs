//! Error types for the AgentMail API client.
//!
//! # Design
//! A single closed enumeration covers every failure a call can produce, from
//! local argument validation through transport errors to HTTP status classes.
//! Variants carry no payload so the enum stays `Copy` and maps 1:1 onto the
//! C error codes exposed by the `agentmail-ffi` crate. Remote failures never
//! panic; only invalid local arguments or allocation failure fail a call
//! before any network activity.

use std::fmt;

/// Errors returned by every `AgentMailClient` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// A caller-supplied argument was empty or malformed.
    InvalidArg,

    /// Buffer allocation failed while accumulating a response.
    NoMem,

    /// The HTTP request could not be constructed.
    Http,

    /// The server returned 401 or 403.
    Auth,

    /// The response body did not parse as JSON.
    Parse,

    /// The server returned 404.
    NotFound,

    /// The server returned 429.
    RateLimit,

    /// The server returned a 5xx status.
    Server,

    /// The transport failed below the HTTP layer.
    Network,

    /// The transport deadline elapsed before the response completed.
    Timeout,

    /// The server returned a status outside every class above.
    Other,
}

impl ApiError {
    /// Classify an HTTP status code: 2xx is success, everything else maps to
    /// exactly one variant.
    pub fn from_status(status: u16) -> Result<(), ApiError> {
        match status {
            200..=299 => Ok(()),
            401 | 403 => Err(ApiError::Auth),
            404 => Err(ApiError::NotFound),
            429 => Err(ApiError::RateLimit),
            s if s >= 500 => Err(ApiError::Server),
            _ => Err(ApiError::Other),
        }
    }

    /// Fixed human-readable description, suitable for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiError::InvalidArg => "Invalid argument",
            ApiError::NoMem => "Out of memory",
            ApiError::Http => "HTTP client error",
            ApiError::Auth => "Authentication failed (401/403)",
            ApiError::Parse => "JSON parse error",
            ApiError::NotFound => "Resource not found (404)",
            ApiError::RateLimit => "Rate limit exceeded (429)",
            ApiError::Server => "Server error (5xx)",
            ApiError::Network => "Network error",
            ApiError::Timeout => "Request timeout",
            ApiError::Other => "Unknown error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ApiError {}
