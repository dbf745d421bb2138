//! Representation of SSE events based on the
//! [HTML Living Standard](https://html.spec.whatwg.org/multipage/server-sent-events.html).

use core::time::Duration;

use bytes::{Bytes, BytesMut};
use bytes_utils::Str;

use crate::{
    constants::{EMPTY_STR, EVENT_TERMINATOR},
    encode::render_header,
};

/// A single SSE event, either built by the caller for encoding or produced
/// by the decoder.
///
/// Empty `event` / `id` strings and a zero `retry` mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The event type. Decoded events default to `"message"`.
    pub event: Str,
    /// The data payload. Multiple `data:` lines are joined with `\n`.
    pub data: Bytes,
    /// The last event ID.
    pub id: Str,
    /// Reconnection delay in milliseconds advertised by the server.
    pub retry: u64,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            event: EMPTY_STR,
            data: Bytes::new(),
            id: EMPTY_STR,
            retry: 0,
        }
    }
}

impl Event {
    /// Create an event carrying only a payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Set the event type.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<Str>) -> Self {
        self.event = event.into();
        self
    }

    /// Set the event ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Str>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the retry delay in milliseconds.
    #[must_use]
    pub fn with_retry(mut self, retry: u64) -> Self {
        self.retry = retry;
        self
    }

    /// The payload as text, or `None` if it is not valid UTF-8.
    pub fn data_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// The retry delay, if one was set.
    pub fn retry_duration(&self) -> Option<Duration> {
        (self.retry > 0).then(|| Duration::from_millis(self.retry))
    }

    /// Render the event into its wire representation.
    ///
    /// Produces the same bytes as [`encode`](crate::encode) without going
    /// through a writer.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.data.len() + 64);
        render_header(self, &mut out);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(EVENT_TERMINATOR);
        out.freeze()
    }
}
