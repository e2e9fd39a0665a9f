//! Blocking HTTP transport.
//!
//! # Design
//! `Transport` is the seam between request construction and the network: one
//! synchronous round trip in, one `HttpResponse` out. The default
//! implementation drives `ureq` with status-as-data enabled so non-2xx
//! responses come back for classification instead of erroring in the
//! transport, and reads the body in fixed-size chunks through a
//! [`ResponseBuffer`] so a single oversized response cannot exhaust memory.
//!
//! Chunked transfer encoding is not accumulated: the body of a chunked
//! response is skipped entirely and the response carries an empty body. The
//! client only reasons about bodies whose length grows incrementally.

use std::io::Read;
use std::time::Duration;

use crate::buffer::ResponseBuffer;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Transport read granularity, matching the buffer's growth assumptions.
const READ_CHUNK: usize = 2048;

/// One synchronous HTTP round trip.
///
/// Implementations must be usable from multiple threads, but the client adds
/// no locking of its own; concurrent calls are only as safe as the
/// implementation makes them.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Default transport over a [`ureq::Agent`].
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build an agent with a global deadline covering the whole call and
    /// non-2xx statuses returned as data.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.path.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let outcome = match request.body.as_deref() {
            Some(body) => {
                let req = builder.body(body.to_string()).map_err(|_| ApiError::Http)?;
                self.agent.run(req)
            }
            None => {
                let req = builder.body(()).map_err(|_| ApiError::Http)?;
                self.agent.run(req)
            }
        };

        let mut response = outcome.map_err(|err| classify_transport_error(&err))?;
        let status = response.status().as_u16();
        let chunked = is_chunked(&response);

        let mut buffer = ResponseBuffer::new()?;
        if !chunked {
            let mut reader = response.body_mut().as_reader();
            let mut scratch = [0u8; READ_CHUNK];
            loop {
                let n = reader.read(&mut scratch).map_err(|err| {
                    if err.kind() == std::io::ErrorKind::TimedOut {
                        ApiError::Timeout
                    } else {
                        ApiError::Network
                    }
                })?;
                if n == 0 {
                    break;
                }
                buffer.push_chunk(&scratch[..n])?;
            }
        }

        Ok(HttpResponse {
            status,
            body: buffer.into_string(),
        })
    }
}

fn is_chunked(response: &ureq::http::Response<ureq::Body>) -> bool {
    response
        .headers()
        .get(ureq::http::header::TRANSFER_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("chunked"))
}

fn classify_transport_error(error: &ureq::Error) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => ApiError::Timeout,
        _ => ApiError::Network,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeouts_classify_as_timeout() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline");
        assert_eq!(
            classify_transport_error(&ureq::Error::Io(io)),
            ApiError::Timeout
        );
    }

    #[test]
    fn other_io_errors_classify_as_network() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            classify_transport_error(&ureq::Error::Io(io)),
            ApiError::Network
        );
    }
}
