//! # hpx-sse-codec
//!
//! Encoder and decoder for the
//! [Server-Sent Events](https://html.spec.whatwg.org/multipage/server-sent-events.html)
//! wire format.
//!
//! The codec is a pair of stateless operations over byte data:
//!
//! - **Encoding** writes one [`Event`] to any [`std::io::Write`] sink as
//!   `event:` / `id:` / `retry:` / `data:` lines followed by a blank line.
//! - **Decoding** drains any [`std::io::Read`] source, strips a leading BOM,
//!   folds `\r\n` and `\r` into `\n`, and returns every complete event.
//!
//! Decoding is lenient: once the input has been read it never fails. Bad
//! `retry` values, `id`s containing NUL, comments and unknown fields are
//! skipped. Only I/O on the caller's sink or source produces an
//! [`SseError`].
//!
//! The encoder copies the payload verbatim after `data: ` and does not split
//! embedded newlines into several `data:` lines, while the decoder joins
//! several `data:` lines with `\n`.
//!
//! ## Quick Start
//!
//! ```rust
//! use hpx_sse_codec::{Event, decode, encode};
//!
//! # fn main() -> Result<(), hpx_sse_codec::SseError> {
//! let event = Event::new("42000.5")
//!     .with_event("price")
//!     .with_id("evt-1")
//!     .with_retry(3000);
//!
//! let mut wire = Vec::new();
//! encode(&mut wire, &event)?;
//! assert_eq!(wire, b"event: price\nid: evt-1\nretry: 3000\ndata: 42000.5\n\n");
//!
//! let events = decode(wire.as_slice())?;
//! assert_eq!(events, vec![event]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tokio` (default): `encode_async` / `decode_async` over
//!   `tokio::io::AsyncWrite` / `AsyncRead`.

pub mod config;
mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod event;
mod parser;

pub use config::CodecConfig;
#[cfg(feature = "tokio")]
pub use decode::decode_async;
pub use decode::{Decoder, decode, decode_bytes};
#[cfg(feature = "tokio")]
pub use encode::encode_async;
pub use encode::{Encoder, encode, encode_with_payload};
pub use error::{SseError, SseResult};
pub use event::Event;
