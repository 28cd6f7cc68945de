//! # Alerts Module
//!
//! Threshold configuration and warning evaluation.
//!
//! This module handles:
//! - Persisting user-configured thresholds across restarts
//! - Evaluating temperature, humidity and accident warnings

pub mod threshold;
pub mod warning;

pub use threshold::{ThresholdConfig, ThresholdStore, ThresholdUpdate};
pub use warning::{evaluate, WarningState};
