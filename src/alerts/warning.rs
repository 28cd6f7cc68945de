//! # Warning Evaluator
//!
//! Compares the latest readings against the alert thresholds.

use serde::Serialize;

use super::threshold::ThresholdConfig;
use crate::telemetry::{AccidentEvent, EnvironmentReading};

/// Active alert conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WarningState {
    pub temperature: bool,
    pub humidity: bool,
    pub accident: bool,
}

impl WarningState {
    /// Number of threshold warnings
    ///
    /// The accident alarm is shown on its own banner and is not counted.
    #[must_use]
    pub fn count(&self) -> usize {
        usize::from(self.temperature) + usize::from(self.humidity)
    }

    /// Whether any condition, accident included, is active
    #[must_use]
    pub fn any(&self) -> bool {
        self.temperature || self.humidity || self.accident
    }
}

/// Evaluate the warning state for a set of readings
///
/// Thresholds are strict: a reading equal to its threshold does not warn.
/// The accident flag is the shock flag of the last accident report.
///
/// # Examples
///
/// ```
/// use asset_monitor::alerts::warning::evaluate;
/// use asset_monitor::alerts::threshold::ThresholdConfig;
/// use asset_monitor::telemetry::{AccidentEvent, EnvironmentReading};
///
/// let env = EnvironmentReading { temperature: 32.0, humidity: 50.0 };
/// let warnings = evaluate(&env, &AccidentEvent::default(), ThresholdConfig::default());
///
/// assert!(warnings.temperature);
/// assert!(!warnings.humidity);
/// assert!(!warnings.accident);
/// ```
#[must_use]
pub fn evaluate(
    env: &EnvironmentReading,
    accident: &AccidentEvent,
    thresholds: ThresholdConfig,
) -> WarningState {
    WarningState {
        temperature: env.temperature > thresholds.temperature,
        humidity: env.humidity > thresholds.humidity,
        accident: accident.shock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(temperature: f64, humidity: f64) -> EnvironmentReading {
        EnvironmentReading { temperature, humidity }
    }

    fn shock(shock: bool) -> AccidentEvent {
        AccidentEvent { accel_m_s2: 12.0, shock, timestamp: 0.0 }
    }

    #[test]
    fn test_temperature_above_threshold() {
        let w = evaluate(&env(30.1, 10.0), &shock(false), ThresholdConfig::default());
        assert!(w.temperature);
        assert!(!w.humidity);
    }

    #[test]
    fn test_equal_to_threshold_is_not_a_warning() {
        let w = evaluate(&env(30.0, 70.0), &shock(false), ThresholdConfig::default());
        assert!(!w.temperature);
        assert!(!w.humidity);
    }

    #[test]
    fn test_humidity_above_threshold() {
        let w = evaluate(&env(20.0, 70.5), &shock(false), ThresholdConfig::default());
        assert!(w.humidity);
        assert!(!w.temperature);
    }

    #[test]
    fn test_accident_is_shock_passthrough() {
        let thresholds = ThresholdConfig::default();
        assert!(evaluate(&env(0.0, 0.0), &shock(true), thresholds).accident);
        assert!(!evaluate(&env(0.0, 0.0), &shock(false), thresholds).accident);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ThresholdConfig { temperature: 20.0, humidity: 40.0 };
        let w = evaluate(&env(25.0, 45.0), &shock(false), thresholds);
        assert_eq!(w, WarningState { temperature: true, humidity: true, accident: false });
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let thresholds = ThresholdConfig::default();
        let a = evaluate(&env(31.0, 71.0), &shock(true), thresholds);
        let b = evaluate(&env(31.0, 71.0), &shock(true), thresholds);
        assert_eq!(a, b);
    }

    #[test]
    fn test_warning_count_excludes_accident() {
        let w = WarningState { temperature: true, humidity: false, accident: true };
        assert_eq!(w.count(), 1);
        assert!(w.any());

        let all = WarningState { temperature: true, humidity: true, accident: false };
        assert_eq!(all.count(), 2);

        assert!(!WarningState::default().any());
    }
}
