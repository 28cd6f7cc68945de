//! # Transport Module
//!
//! Boundary between the device link and the telemetry core.
//!
//! This module handles:
//! - Decoding wire frames into typed [`TransportMessage`]s
//! - A TCP client that reads one JSON frame per line
//! - Reporting connect/disconnect and reconnecting after link loss
//!
//! Two frame shapes are accepted:
//!
//! ```text
//! {"event": "dht22", "data": {"temperature": 31.2, "humidity": 48}}
//! ["gps", {"latitude": 6.799045, "longitude": 80.041413}]
//! ```

pub mod tcp;

pub use tcp::TcpTransport;

use serde_json::Value;
use tracing::debug;

use crate::telemetry::EventKind;

/// Notification delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMessage {
    /// Link established
    Connected,

    /// Link lost
    Disconnected,

    /// Telemetry event with its raw payload; payload validation is left to the core
    Event { kind: EventKind, payload: Value },
}

/// Decode one wire frame
///
/// Returns `None` for blank lines, invalid JSON, unknown event names and
/// frames of any other shape.
///
/// # Examples
///
/// ```
/// use asset_monitor::transport::{decode_frame, TransportMessage};
/// use asset_monitor::telemetry::EventKind;
///
/// let msg = decode_frame(r#"["gps", {"latitude": 1, "longitude": 2}]"#);
/// assert!(matches!(msg, Some(TransportMessage::Event { kind: EventKind::Gps, .. })));
///
/// assert!(decode_frame(r#"{"event": "battery", "data": {}}"#).is_none());
/// ```
pub fn decode_frame(line: &str) -> Option<TransportMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let frame: Value = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Dropped unparsable frame: {}", e);
            return None;
        }
    };

    let (name, payload) = match frame {
        Value::Object(mut fields) => {
            let name = fields.get("event").and_then(Value::as_str)?.to_string();
            (name, fields.remove("data").unwrap_or(Value::Null))
        }
        Value::Array(mut items) if !items.is_empty() => {
            let payload = if items.len() > 1 { items.swap_remove(1) } else { Value::Null };
            let name = items.first().and_then(Value::as_str)?.to_string();
            (name, payload)
        }
        _ => {
            debug!("Dropped frame with unexpected shape");
            return None;
        }
    };

    match name.parse::<EventKind>() {
        Ok(kind) => Some(TransportMessage::Event { kind, payload }),
        Err(()) => {
            debug!("Dropped frame for unknown event '{}'", name);
            None
        }
    }
}
