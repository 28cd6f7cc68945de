//! # Payload Normalization
//!
//! Turns raw JSON payloads from the device link into typed readings.
//!
//! The hardware link is noisy, so nothing here returns an error: a payload
//! that is not an object, or that lacks a required field, yields `None` and
//! the caller drops it.

use serde_json::{Map, Value};
use tracing::trace;

use super::{AccidentEvent, EnvironmentReading, EventKind, GpsReading, RecordData};

/// Coerce a JSON value to a finite number
///
/// Accepts JSON numbers and strings holding a number (surrounding
/// whitespace allowed). Empty strings, `NaN` and infinities are rejected.
///
/// # Examples
///
/// ```
/// use asset_monitor::telemetry::payload::coerce_number;
/// use serde_json::json;
///
/// assert_eq!(coerce_number(&json!(31.5)), Some(31.5));
/// assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
/// assert_eq!(coerce_number(&json!("warm")), None);
/// assert_eq!(coerce_number(&json!(null)), None);
/// ```
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Coerce a JSON value to a boolean
///
/// Accepts booleans, the strings `"true"`/`"false"` and the integers 0/1.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn number_field(fields: &Map<String, Value>, name: &str) -> Option<f64> {
    let number = fields.get(name).and_then(coerce_number);
    if number.is_none() {
        trace!("Payload field '{}' missing or not numeric", name);
    }
    number
}

fn object(payload: &Value) -> Option<&Map<String, Value>> {
    payload.as_object().filter(|fields| !fields.is_empty())
}

/// Parse a `gps` payload
pub fn parse_gps(payload: &Value) -> Option<GpsReading> {
    let fields = object(payload)?;
    Some(GpsReading {
        latitude: number_field(fields, "latitude")?,
        longitude: number_field(fields, "longitude")?,
    })
}

/// Parse a `dht22` payload
pub fn parse_environment(payload: &Value) -> Option<EnvironmentReading> {
    let fields = object(payload)?;
    Some(EnvironmentReading {
        temperature: number_field(fields, "temperature")?,
        humidity: number_field(fields, "humidity")?,
    })
}

/// Parse an `accident` payload
pub fn parse_accident(payload: &Value) -> Option<AccidentEvent> {
    let fields = object(payload)?;
    Some(AccidentEvent {
        accel_m_s2: number_field(fields, "accel_m_s2")?,
        shock: fields.get("shock").and_then(coerce_bool)?,
        timestamp: number_field(fields, "timestamp")?,
    })
}

/// Parse a payload of the given stream into a record reading
///
/// # Examples
///
/// ```
/// use asset_monitor::telemetry::payload::normalize;
/// use asset_monitor::telemetry::{EventKind, RecordData};
/// use serde_json::json;
///
/// let data = normalize(EventKind::Dht22, &json!({"temperature": "32", "humidity": 50}));
/// assert!(matches!(data, Some(RecordData::Environment(_))));
///
/// assert!(normalize(EventKind::Dht22, &json!({})).is_none());
/// ```
pub fn normalize(kind: EventKind, payload: &Value) -> Option<RecordData> {
    match kind {
        EventKind::Gps => parse_gps(payload).map(RecordData::Gps),
        EventKind::Dht22 => parse_environment(payload).map(RecordData::Environment),
        EventKind::Accident => parse_accident(payload).map(RecordData::Accident),
    }
}
