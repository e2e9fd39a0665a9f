//! Bounded accumulator for HTTP response bodies.
//!
//! # Design
//! Transports deliver a response body as a sequence of chunks whose count and
//! sizes are unknown up front. `ResponseBuffer` collects them into one owned
//! byte buffer with an explicit capacity policy: start at 4 KiB, double on
//! demand, never exceed a 32 KiB ceiling. Doubling keeps the copy cost linear
//! across many small chunks; the ceiling bounds worst-case memory for one
//! in-flight request on a constrained target.
//!
//! Once growth can no longer make progress, whole chunks are dropped and the
//! buffer is marked truncated; earlier chunks already accepted are retained
//! unchanged. Growth is fallible (`try_reserve_exact`), so allocation failure
//! surfaces as `ApiError::NoMem` instead of aborting.

use tracing::error;

use crate::error::ApiError;

/// Capacity every buffer starts with.
pub const INITIAL_CAPACITY: usize = 4096;

/// Hard ceiling; the buffer never grows past this.
pub const MAX_CAPACITY: usize = 32 * 1024;

/// Growable byte buffer with a hard capacity ceiling.
///
/// Invariants after every successful append: `capacity >= len + 1` (one slot
/// stays reserved for a terminator), capacity never decreases, and capacity
/// never exceeds [`MAX_CAPACITY`].
#[derive(Debug)]
pub struct ResponseBuffer {
    buf: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

impl ResponseBuffer {
    /// Allocate an empty buffer at [`INITIAL_CAPACITY`].
    pub fn new() -> Result<Self, ApiError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(INITIAL_CAPACITY)
            .map_err(|_| ApiError::NoMem)?;
        Ok(Self {
            buf,
            capacity: INITIAL_CAPACITY,
            truncated: false,
        })
    }

    /// Append one chunk.
    ///
    /// Returns `Ok(true)` if the chunk was appended, `Ok(false)` if it was
    /// dropped because the buffer cannot grow any further. A dropped chunk
    /// does not stop the request; later (smaller) chunks are still offered
    /// the same test.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<bool, ApiError> {
        if chunk.is_empty() {
            return Ok(true);
        }
        let new_len = self.buf.len() + chunk.len();
        if new_len >= self.capacity {
            let new_capacity = MAX_CAPACITY.min(new_len.saturating_mul(2));
            // No progress possible: either already at the ceiling, or the
            // chunk alone would not fit below it even after growing.
            if new_capacity <= self.capacity || new_len >= new_capacity {
                self.truncated = true;
                error!(
                    dropped = chunk.len(),
                    retained = self.buf.len(),
                    "response exceeds {MAX_CAPACITY} bytes, dropping data"
                );
                return Ok(false);
            }
            self.buf
                .try_reserve_exact(new_capacity - self.buf.len())
                .map_err(|_| ApiError::NoMem)?;
            self.capacity = new_capacity;
        }
        self.buf.extend_from_slice(chunk);
        Ok(true)
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current policy capacity (not the allocator's view).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once any chunk has been dropped at the ceiling.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Consume the buffer, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Consume the buffer, returning the bytes as text. Invalid UTF-8 is
    /// replaced rather than rejected; response classification does not
    /// depend on the body being well-formed.
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}
