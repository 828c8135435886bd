//! Newline-delimited frame handling.
//!
//! The server batches queued messages into a single WebSocket text frame,
//! separated by `\n`. Each segment is an independent JSON envelope; one bad
//! segment must not stop the rest of the frame from being dispatched.

use log::warn;

use crate::models::Envelope;

/// Decode every envelope in a physical text frame, preserving order.
///
/// Blank segments are skipped. A segment that fails to parse is logged and
/// dropped; decoding continues with the next segment.
pub fn decode_frame(raw: &str) -> Vec<Envelope> {
    let mut envelopes = Vec::new();
    for segment in raw.split('\n') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match serde_json::from_str::<Envelope>(segment) {
            Ok(envelope) => envelopes.push(envelope),
            Err(e) => {
                let sample: String = segment.chars().take(200).collect();
                warn!("Error parsing message segment: {} (segment: {})", e, sample);
            }
        }
    }
    envelopes
}

/// Encode one envelope as a single outbound frame.
pub fn encode_frame(envelope: &Envelope) -> String {
    // Envelope contains only a String and a Value; serialization cannot fail.
    serde_json::to_string(envelope).unwrap_or_default()
}
