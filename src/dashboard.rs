//! # Dashboard Core
//!
//! Owns all dashboard state and applies inbound commands to it one at a
//! time.
//!
//! ## Control Flow
//!
//! The transport and the operator console push [`CoreCommand`]s into a
//! single mpsc channel. [`run`] drains it and handles each command to
//! completion before taking the next:
//!
//! 1. Telemetry event: normalize the payload, replace the latest reading,
//!    refresh the connection timestamp, append a history record, re-evaluate
//!    warnings
//! 2. Threshold edit: persist, then re-evaluate against the last known readings
//! 3. Connect/disconnect: update the connectivity flag
//!
//! After every mutation a complete [`DashboardSnapshot`] is published on a
//! watch channel. Projections only ever read those snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::alerts::threshold::{ThresholdConfig, ThresholdStore, ThresholdUpdate};
use crate::alerts::warning::{evaluate, WarningState};
use crate::error::Result;
use crate::monitor::{ConnectionMonitor, ConnectivityState};
use crate::telemetry::history::{HistoryBuffer, SeriesPoint, TimeSeries};
use crate::telemetry::payload::normalize;
use crate::telemetry::status::{HumidityBand, TemperatureBand};
use crate::telemetry::{
    AccidentEvent, EnvironmentReading, EventKind, GpsReading, HistoryRecord, RecordData,
};
use crate::transport::TransportMessage;

/// Read-only view of the core state
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub latest_gps: Option<GpsReading>,
    pub latest_env: Option<EnvironmentReading>,
    pub latest_accident: Option<AccidentEvent>,
    pub connectivity: ConnectivityState,
    pub thresholds: ThresholdConfig,
    pub warnings: WarningState,
    /// Audit log, most recent last
    pub history: Vec<HistoryRecord>,
    pub temperature_series: Vec<SeriesPoint>,
    pub humidity_series: Vec<SeriesPoint>,
}

impl DashboardSnapshot {
    /// The `limit` most recent history records, newest first
    pub fn recent_history(&self, limit: usize) -> impl Iterator<Item = &HistoryRecord> {
        self.history.iter().rev().take(limit)
    }

    /// Position for the map marker: the latest fix, else `home`
    #[must_use]
    pub fn marker_position(&self, home: GpsReading) -> GpsReading {
        self.latest_gps.unwrap_or(home)
    }

    pub fn temperature_band(&self) -> Option<TemperatureBand> {
        self.latest_env.map(|env| TemperatureBand::classify(env.temperature))
    }

    pub fn humidity_band(&self) -> Option<HumidityBand> {
        self.latest_env.map(|env| HumidityBand::classify(env.humidity))
    }
}

/// Command consumed by [`run`]
#[derive(Debug)]
pub enum CoreCommand {
    /// Notification from the telemetry transport
    Transport(TransportMessage),

    /// Threshold edit from the operator; the outcome is sent on `reply` if given
    UpdateThresholds {
        update: ThresholdUpdate,
        reply: Option<oneshot::Sender<Result<ThresholdConfig>>>,
    },

    /// Stop the loop
    Shutdown,
}

/// Owner of readings, history, warnings and connectivity
#[derive(Debug)]
pub struct TelemetryCore {
    latest_gps: Option<GpsReading>,
    latest_env: Option<EnvironmentReading>,
    latest_accident: Option<AccidentEvent>,
    connection: ConnectionMonitor,
    history: HistoryBuffer,
    temperature_series: TimeSeries,
    humidity_series: TimeSeries,
    warnings: WarningState,
    thresholds: ThresholdStore,
    publisher: watch::Sender<DashboardSnapshot>,
}

impl TelemetryCore {
    /// Create a core using the thresholds already loaded into `thresholds`
    pub fn new(thresholds: ThresholdStore) -> Self {
        let (publisher, _) = watch::channel(DashboardSnapshot::default());
        let mut core = Self {
            latest_gps: None,
            latest_env: None,
            latest_accident: None,
            connection: ConnectionMonitor::new(),
            history: HistoryBuffer::new(),
            temperature_series: TimeSeries::new(),
            humidity_series: TimeSeries::new(),
            warnings: WarningState::default(),
            thresholds,
            publisher,
        };
        core.warnings = core.evaluate_current();
        core.publish();
        core
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.publisher.subscribe()
    }

    /// Ingest a telemetry event captured now
    pub fn ingest(&mut self, kind: EventKind, payload: &Value) -> bool {
        self.ingest_at(kind, payload, Utc::now())
    }

    /// Ingest a telemetry event captured at `now`
    ///
    /// Returns `false` when the payload was dropped. A dropped payload
    /// changes nothing and publishes nothing.
    pub fn ingest_at(&mut self, kind: EventKind, payload: &Value, now: DateTime<Utc>) -> bool {
        let Some(data) = normalize(kind, payload) else {
            debug!("Dropped malformed '{}' payload: {}", kind, payload);
            return false;
        };

        match data {
            RecordData::Gps(gps) => self.latest_gps = Some(gps),
            RecordData::Environment(env) => {
                self.latest_env = Some(env);
                self.temperature_series.push(now, env.temperature);
                self.humidity_series.push(now, env.humidity);
            }
            RecordData::Accident(accident) => self.latest_accident = Some(accident),
        }

        self.connection.on_event(now);
        self.history.append(HistoryRecord::new(now, data));
        self.reevaluate();
        self.publish();
        true
    }

    /// Transport connected
    pub fn on_connect(&mut self) {
        self.connection.on_connect();
        self.publish();
    }

    /// Transport disconnected
    pub fn on_disconnect(&mut self) {
        self.connection.on_disconnect();
        self.publish();
    }

    /// Apply a threshold edit and re-evaluate against the last known readings
    ///
    /// # Errors
    ///
    /// Returns error if the edit is invalid or cannot be persisted; state is unchanged
    pub fn update_thresholds(&mut self, update: ThresholdUpdate) -> Result<ThresholdConfig> {
        let config = self.thresholds.update(update)?;
        self.reevaluate();
        self.publish();
        Ok(config)
    }

    /// Apply one command. Returns `false` once the loop should stop.
    pub fn handle(&mut self, command: CoreCommand) -> bool {
        match command {
            CoreCommand::Transport(TransportMessage::Connected) => self.on_connect(),
            CoreCommand::Transport(TransportMessage::Disconnected) => self.on_disconnect(),
            CoreCommand::Transport(TransportMessage::Event { kind, payload }) => {
                self.ingest(kind, &payload);
            }
            CoreCommand::UpdateThresholds { update, reply } => {
                let result = self.update_thresholds(update);
                if let Err(e) = &result {
                    warn!("Threshold update rejected: {}", e);
                }
                if let Some(reply) = reply {
                    // The requester may have gone away
                    let _ = reply.send(result);
                }
            }
            CoreCommand::Shutdown => return false,
        }
        true
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            latest_gps: self.latest_gps,
            latest_env: self.latest_env,
            latest_accident: self.latest_accident,
            connectivity: self.connection.state(),
            thresholds: self.thresholds.current(),
            warnings: self.warnings,
            history: self.history.snapshot(),
            temperature_series: self.temperature_series.snapshot(),
            humidity_series: self.humidity_series.snapshot(),
        }
    }

    pub fn warnings(&self) -> WarningState {
        self.warnings
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Readings not seen yet evaluate as a zero reading with no shock
    fn evaluate_current(&self) -> WarningState {
        evaluate(
            &self.latest_env.unwrap_or_default(),
            &self.latest_accident.unwrap_or_default(),
            self.thresholds.current(),
        )
    }

    fn reevaluate(&mut self) {
        let next = self.evaluate_current();
        let prev = std::mem::replace(&mut self.warnings, next);

        if next.accident != prev.accident {
            if next.accident {
                let accel = self.latest_accident.map(|a| a.accel_m_s2).unwrap_or_default();
                warn!("Accident detected: {:.2} m/s²", accel);
            } else {
                info!("Accident alarm cleared");
            }
        }
        if next.temperature && !prev.temperature {
            warn!("Temperature above threshold");
        }
        if next.humidity && !prev.humidity {
            warn!("Humidity above threshold");
        }
        if prev.any() && !next.any() {
            info!("All warnings cleared");
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }
}

/// Drain `commands` until [`CoreCommand::Shutdown`] or until every sender is gone
///
/// Returns the core so callers can inspect the final state.
pub async fn run(
    mut core: TelemetryCore,
    mut commands: mpsc::Receiver<CoreCommand>,
) -> TelemetryCore {
    info!("Telemetry core started");
    while let Some(command) = commands.recv().await {
        if !core.handle(command) {
            break;
        }
    }
    info!("Telemetry core stopped ({} history records)", core.history.len());
    core
}
