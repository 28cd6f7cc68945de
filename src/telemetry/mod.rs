//! # Telemetry Module
//!
//! Sensor readings reported by the tracked vehicle and the records kept
//! about them.
//!
//! This module handles:
//! - Typed readings for the `gps`, `dht22` and `accident` streams
//! - Payload validation and numeric coercion
//! - Bounded history and chart time-series windows
//! - Derived display classifications

pub mod history;
pub mod payload;
pub mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Latest GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsReading {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Latest DHT22 temperature/humidity reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentReading {
    /// Temperature in °C
    pub temperature: f64,

    /// Relative humidity in %
    pub humidity: f64,
}

/// Latest accident sensor report
///
/// `shock` is a momentary condition: it stays set only until the next
/// accident report says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccidentEvent {
    /// Measured acceleration in m/s²
    pub accel_m_s2: f64,

    /// Shock detected
    pub shock: bool,

    /// Device-side timestamp
    pub timestamp: f64,
}

/// Event stream name as delivered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Gps,
    Dht22,
    Accident,
}

impl EventKind {
    /// Wire name of the stream
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Gps => "gps",
            EventKind::Dht22 => "dht22",
            EventKind::Accident => "accident",
        }
    }

    /// History record kind produced by this stream
    pub fn sensor(&self) -> SensorKind {
        match self {
            EventKind::Gps => SensorKind::Gps,
            EventKind::Dht22 => SensorKind::Dht,
            EventKind::Accident => SensorKind::Accident,
        }
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gps" => Ok(EventKind::Gps),
            "dht22" => Ok(EventKind::Dht22),
            "accident" => Ok(EventKind::Accident),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensor type of a history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Gps,
    Dht,
    Accident,
}

impl SensorKind {
    /// Label used in the audit table
    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Gps => "GPS",
            SensorKind::Dht => "DHT22",
            SensorKind::Accident => "Accident",
        }
    }
}

/// Reading carried by a history record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    Gps(GpsReading),
    Environment(EnvironmentReading),
    Accident(AccidentEvent),
}

impl RecordData {
    /// Sensor kind matching the carried reading
    pub fn kind(&self) -> SensorKind {
        match self {
            RecordData::Gps(_) => SensorKind::Gps,
            RecordData::Environment(_) => SensorKind::Dht,
            RecordData::Accident(_) => SensorKind::Accident,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Gps(gps) => {
                write!(f, "Lat: {:.4}, Lon: {:.4}", gps.latitude, gps.longitude)
            }
            RecordData::Environment(env) => {
                write!(f, "Temp: {:.1}°C, Hum: {:.1}%", env.temperature, env.humidity)
            }
            RecordData::Accident(acc) => write!(
                f,
                "Accel: {:.2} m/s², Shock: {}",
                acc.accel_m_s2,
                if acc.shock { "Yes" } else { "No" }
            ),
        }
    }
}

/// One entry of the audit log
///
/// `time` is the capture time on this side of the link, not the device
/// timestamp. Records are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "type")]
    pub kind: SensorKind,
    pub time: DateTime<Utc>,
    pub data: RecordData,
}

impl HistoryRecord {
    /// Create a record, deriving the kind from the reading
    pub fn new(time: DateTime<Utc>, data: RecordData) -> Self {
        Self {
            kind: data.kind(),
            time,
            data,
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<8} {}",
            self.time.format("%Y-%m-%d %H:%M:%S"),
            self.kind.label(),
            self.data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_kind_from_str() {
        assert_eq!("gps".parse::<EventKind>(), Ok(EventKind::Gps));
        assert_eq!("dht22".parse::<EventKind>(), Ok(EventKind::Dht22));
        assert_eq!("accident".parse::<EventKind>(), Ok(EventKind::Accident));
        assert!("dht".parse::<EventKind>().is_err());
        assert!("GPS".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_event_kind_maps_to_sensor_kind() {
        assert_eq!(EventKind::Gps.sensor(), SensorKind::Gps);
        assert_eq!(EventKind::Dht22.sensor(), SensorKind::Dht);
        assert_eq!(EventKind::Accident.sensor(), SensorKind::Accident);
    }

    #[test]
    fn test_record_kind_follows_data() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = HistoryRecord::new(
            time,
            RecordData::Environment(EnvironmentReading { temperature: 32.0, humidity: 50.0 }),
        );
        assert_eq!(record.kind, SensorKind::Dht);
    }

    #[test]
    fn test_record_summaries() {
        let gps = RecordData::Gps(GpsReading { latitude: 6.799045, longitude: 80.041413 });
        assert_eq!(gps.to_string(), "Lat: 6.7990, Lon: 80.0414");

        let env = RecordData::Environment(EnvironmentReading { temperature: 32.0, humidity: 50.0 });
        assert_eq!(env.to_string(), "Temp: 32.0°C, Hum: 50.0%");

        let acc =
            RecordData::Accident(AccidentEvent { accel_m_s2: 9.81, shock: true, timestamp: 1.0 });
        assert_eq!(acc.to_string(), "Accel: 9.81 m/s², Shock: Yes");
    }

    #[test]
    fn test_record_serializes_with_iso_time_and_type() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let record = HistoryRecord::new(
            time,
            RecordData::Gps(GpsReading { latitude: 1.5, longitude: 2.5 }),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "gps");
        assert_eq!(json["time"], "2024-05-01T12:30:00Z");
        assert_eq!(json["data"]["latitude"], 1.5);
    }

    #[test]
    fn test_sensor_labels() {
        assert_eq!(SensorKind::Gps.label(), "GPS");
        assert_eq!(SensorKind::Dht.label(), "DHT22");
        assert_eq!(SensorKind::Accident.label(), "Accident");
    }
}
