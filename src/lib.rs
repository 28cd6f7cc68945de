//! # Asset Monitor Library
//!
//! Real-time telemetry core for a single tracked vehicle fitted with GPS,
//! DHT22 temperature/humidity and shock sensors.
//!
//! This library ingests the `gps`, `dht22` and `accident` event streams,
//! keeps bounded history and chart windows, evaluates alert thresholds,
//! mirrors connection liveness, and persists the thresholds across restarts.

pub mod alerts;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod monitor;
pub mod telemetry;
pub mod transport;
