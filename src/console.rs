//! # Operator Console
//!
//! Text commands for editing thresholds and a plain-text projection of
//! dashboard snapshots.
//!
//! ## Commands
//!
//! ```text
//! set temperature <value>   Set the temperature threshold (°C)
//! set humidity <value>      Set the humidity threshold (%)
//! show                      Print the current status
//! history [n]               Print the n most recent records (default 10)
//! help                      Print this list
//! quit                      Stop the monitor
//! ```

use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use std::fmt::Write;

use crate::alerts::threshold::ThresholdUpdate;
use crate::dashboard::DashboardSnapshot;
use crate::error::{MonitorError, Result};
use crate::telemetry::payload::coerce_number;
use crate::telemetry::GpsReading;

/// Number of records `history` prints without an argument
pub const DEFAULT_HISTORY_ROWS: usize = 10;

/// Command list printed by `help`
pub const HELP: &str = "\
set temperature <value>   Set the temperature threshold (°C)
set humidity <value>      Set the humidity threshold (%)
show                      Print the current status
history [n]               Print the n most recent records
help                      Print this list
quit                      Stop the monitor";

/// Parsed operator command
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    SetThreshold(ThresholdUpdate),
    Show,
    History(usize),
    Help,
    Quit,
}

/// Parse one console line
///
/// Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidCommand`] for unknown commands or bad arguments
///
/// # Examples
///
/// ```
/// use asset_monitor::console::{parse_command, ConsoleCommand};
/// use asset_monitor::alerts::ThresholdUpdate;
///
/// let cmd = parse_command("set temperature 35").unwrap();
/// assert_eq!(cmd, Some(ConsoleCommand::SetThreshold(ThresholdUpdate::temperature(35.0))));
/// ```
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let words: Vec<&str> = line.split_whitespace().collect();

    let command = match words.as_slice() {
        [] => return Ok(None),
        ["set", field, value] => {
            let value = coerce_number(&Value::String(value.to_string())).ok_or_else(|| {
                MonitorError::InvalidCommand(format!("'{}' is not a number", value))
            })?;
            match *field {
                "temperature" | "temp" => {
                    ConsoleCommand::SetThreshold(ThresholdUpdate::temperature(value))
                }
                "humidity" | "hum" => {
                    ConsoleCommand::SetThreshold(ThresholdUpdate::humidity(value))
                }
                other => {
                    return Err(MonitorError::InvalidCommand(format!(
                        "unknown threshold '{}' (expected temperature or humidity)",
                        other
                    )))
                }
            }
        }
        ["show"] | ["status"] => ConsoleCommand::Show,
        ["history"] => ConsoleCommand::History(DEFAULT_HISTORY_ROWS),
        ["history", n] => {
            let rows = n.parse::<usize>().map_err(|_| {
                MonitorError::InvalidCommand(format!("'{}' is not a record count", n))
            })?;
            ConsoleCommand::History(rows)
        }
        ["help"] | ["?"] => ConsoleCommand::Help,
        ["quit"] | ["exit"] => ConsoleCommand::Quit,
        _ => return Err(MonitorError::InvalidCommand(line.trim().to_string())),
    };

    Ok(Some(command))
}

/// Multi-line status summary of a snapshot
pub fn render_summary(
    snapshot: &DashboardSnapshot,
    home: GpsReading,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let connectivity = snapshot.connectivity;

    let link = if connectivity.is_online { "Online" } else { "Offline" };
    match (connectivity.last_update_time, connectivity.since(now)) {
        (Some(t), Some(elapsed)) => {
            let age = elapsed.num_seconds().max(0);
            let _ = writeln!(
                out,
                "Asset:       {} (last update {}, {}s ago)",
                link,
                t.with_timezone(&Local).format("%H:%M:%S"),
                age
            );
        }
        _ => {
            let _ = writeln!(out, "Asset:       {} (no data yet)", link);
        }
    }

    let position = snapshot.marker_position(home);
    let _ = writeln!(
        out,
        "Location:    {:.6}, {:.6}{}",
        position.latitude,
        position.longitude,
        if snapshot.latest_gps.is_none() { " (home)" } else { "" }
    );

    let thresholds = snapshot.thresholds;
    let warnings = snapshot.warnings;
    match snapshot.latest_env {
        Some(env) => {
            let _ = writeln!(
                out,
                "Temperature: {:.1}°C ({}), threshold {:.1}°C{}",
                env.temperature,
                snapshot.temperature_band().map(|b| b.to_string()).unwrap_or_default(),
                thresholds.temperature,
                if warnings.temperature { "  WARNING" } else { "" }
            );
            let _ = writeln!(
                out,
                "Humidity:    {:.1}% ({}), threshold {:.1}%{}",
                env.humidity,
                snapshot.humidity_band().map(|b| b.to_string()).unwrap_or_default(),
                thresholds.humidity,
                if warnings.humidity { "  WARNING" } else { "" }
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Environment: no reading yet, thresholds {:.1}°C / {:.1}%",
                thresholds.temperature, thresholds.humidity
            );
        }
    }

    match snapshot.latest_accident {
        Some(accident) if warnings.accident => {
            let _ = writeln!(out, "Accident:    DETECTED ({:.2} m/s²)", accident.accel_m_s2);
        }
        _ => {
            let _ = writeln!(out, "Accident:    none");
        }
    }

    let _ = writeln!(out, "Warnings:    {}", warnings.count());
    let _ = write!(out, "History:     {} records", snapshot.history.len());
    out
}

/// The `limit` most recent history records, newest first
pub fn render_history(snapshot: &DashboardSnapshot, limit: usize) -> String {
    if snapshot.history.is_empty() {
        return "No data available yet".to_string();
    }

    snapshot
        .recent_history(limit)
        .map(|record| record.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::threshold::{MemoryStore, ThresholdStore};
    use crate::dashboard::TelemetryCore;
    use crate::telemetry::EventKind;
    use chrono::TimeZone;
    use serde_json::json;

    fn home() -> GpsReading {
        GpsReading { latitude: 6.799045, longitude: 80.041413 }
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, secs).unwrap()
    }

    fn core() -> TelemetryCore {
        TelemetryCore::new(ThresholdStore::open(Box::new(MemoryStore::new())))
    }

    #[test]
    fn test_parse_set_commands() {
        assert_eq!(
            parse_command("set temperature 35").unwrap(),
            Some(ConsoleCommand::SetThreshold(ThresholdUpdate::temperature(35.0)))
        );
        assert_eq!(
            parse_command("  set hum  62.5 ").unwrap(),
            Some(ConsoleCommand::SetThreshold(ThresholdUpdate::humidity(62.5)))
        );
    }

    #[test]
    fn test_parse_set_rejects_bad_values() {
        let rejected = [
            "set temperature hot",
            "set pressure 3",
            "set temperature",
            "set temperature NaN",
        ];
        for line in rejected {
            assert!(matches!(parse_command(line), Err(MonitorError::InvalidCommand(_))));
        }
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("show").unwrap(), Some(ConsoleCommand::Show));
        assert_eq!(
            parse_command("history").unwrap(),
            Some(ConsoleCommand::History(DEFAULT_HISTORY_ROWS))
        );
        assert_eq!(parse_command("history 3").unwrap(), Some(ConsoleCommand::History(3)));
        assert!(parse_command("history -1").is_err());
        assert_eq!(parse_command("help").unwrap(), Some(ConsoleCommand::Help));
        assert_eq!(parse_command("quit").unwrap(), Some(ConsoleCommand::Quit));
        assert!(parse_command("reboot").is_err());
    }

    #[test]
    fn test_summary_before_any_data() {
        let summary = render_summary(&core().snapshot(), home(), at(0));
        assert!(summary.contains("Offline (no data yet)"));
        assert!(summary.contains("6.799045, 80.041413 (home)"));
        assert!(summary.contains("no reading yet"));
        assert!(summary.contains("Accident:    none"));
        assert!(summary.contains("Warnings:    0"));
    }

    #[test]
    fn test_summary_with_warnings() {
        let mut core = core();
        core.on_connect();
        core.ingest_at(EventKind::Dht22, &json!({"temperature": 32, "humidity": 50}), at(0));
        let accident = json!({"accel_m_s2": 27.4, "shock": true, "timestamp": 1});
        core.ingest_at(EventKind::Accident, &accident, at(2));

        let summary = render_summary(&core.snapshot(), home(), at(7));
        assert!(summary.contains("Online"));
        assert!(summary.contains("5s ago"));
        assert!(summary.contains("32.0°C (Warm), threshold 30.0°C  WARNING"));
        assert!(summary.contains("50.0% (Comfortable), threshold 70.0%\n"));
        assert!(summary.contains("DETECTED (27.40 m/s²)"));
        assert!(summary.contains("Warnings:    1"));
        assert!(summary.ends_with("History:     2 records"));
    }

    #[test]
    fn test_history_newest_first_and_limited() {
        let mut core = core();
        for i in 0..5 {
            core.ingest_at(EventKind::Gps, &json!({"latitude": i, "longitude": 0}), at(i));
        }

        let rendered = render_history(&core.snapshot(), 2);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Lat: 4.0000"));
        assert!(lines[1].contains("Lat: 3.0000"));
    }

    #[test]
    fn test_history_empty() {
        assert_eq!(render_history(&core().snapshot(), 10), "No data available yet");
    }
}
