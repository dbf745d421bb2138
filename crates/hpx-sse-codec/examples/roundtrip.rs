//! SSE Round Trip Example
//!
//! Encodes a few events into an in-memory buffer, then decodes them again.
//!
//! Run with: `RUST_LOG=debug cargo run -p hpx-sse-codec --example roundtrip`

use hpx_sse_codec::{CodecConfig, Decoder, Event, SseResult, decode_async, encode_async};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> SseResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let events = [
        Event::new("73857293").with_event("add").with_id("1"),
        Event::new("2153").with_event("remove").with_id("2"),
        Event::new("{\"price\": 42000}").with_retry(3000),
    ];

    let mut wire = Vec::new();
    for event in &events {
        encode_async(&mut wire, event).await?;
    }

    println!("Encoded stream:");
    println!("{}", String::from_utf8_lossy(&wire));

    for event in decode_async(wire.as_slice()).await? {
        println!(
            "type={} id={} retry={:?} data={}",
            &*event.event,
            &*event.id,
            event.retry_duration(),
            event.data_str().unwrap_or("<binary>")
        );
    }

    // Hand-written input with CRLF endings, a BOM and a comment.
    let decoder = Decoder::new(CodecConfig::new().default_event_type("tick"))?;
    let raw: &'static [u8] = b"\xEF\xBB\xBF: heartbeat\r\ndata: line one\r\ndata: line two\r\n\r\n";
    for event in decoder.decode_bytes(raw) {
        println!("type={} data={:?}", &*event.event, event.data_str());
    }

    Ok(())
}
