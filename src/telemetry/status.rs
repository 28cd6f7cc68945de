//! # Reading Status
//!
//! Coarse classifications of environment readings for status cards.

use serde::Serialize;
use std::fmt;

/// Upper end of the temperature gauge in °C
pub const TEMPERATURE_GAUGE_MAX: f64 = 50.0;

/// Temperature band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureBand {
    Cold,
    Normal,
    Warm,
    Hot,
}

impl TemperatureBand {
    /// Classify a temperature in °C
    ///
    /// # Examples
    ///
    /// ```
    /// use asset_monitor::telemetry::status::TemperatureBand;
    ///
    /// assert_eq!(TemperatureBand::classify(9.9), TemperatureBand::Cold);
    /// assert_eq!(TemperatureBand::classify(25.0), TemperatureBand::Warm);
    /// ```
    #[must_use]
    pub fn classify(temperature: f64) -> Self {
        if temperature < 10.0 {
            TemperatureBand::Cold
        } else if temperature < 25.0 {
            TemperatureBand::Normal
        } else if temperature < 35.0 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Hot
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemperatureBand::Cold => "Cold",
            TemperatureBand::Normal => "Normal",
            TemperatureBand::Warm => "Warm",
            TemperatureBand::Hot => "Hot",
        };
        f.write_str(s)
    }
}

/// Humidity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HumidityBand {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityBand {
    /// Classify a relative humidity in %
    #[must_use]
    pub fn classify(humidity: f64) -> Self {
        if humidity < 30.0 {
            HumidityBand::Dry
        } else if humidity < 60.0 {
            HumidityBand::Comfortable
        } else {
            HumidityBand::Humid
        }
    }
}

impl fmt::Display for HumidityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HumidityBand::Dry => "Dry",
            HumidityBand::Comfortable => "Comfortable",
            HumidityBand::Humid => "Humid",
        };
        f.write_str(s)
    }
}

/// Temperature gauge fill in percent (0-100)
#[must_use]
pub fn temperature_gauge(temperature: f64) -> f64 {
    (temperature / TEMPERATURE_GAUGE_MAX * 100.0).clamp(0.0, 100.0)
}

/// Humidity gauge fill in percent (0-100)
#[must_use]
pub fn humidity_gauge(humidity: f64) -> f64 {
    humidity.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_band_boundaries() {
        assert_eq!(TemperatureBand::classify(-5.0), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::classify(10.0), TemperatureBand::Normal);
        assert_eq!(TemperatureBand::classify(24.9), TemperatureBand::Normal);
        assert_eq!(TemperatureBand::classify(34.9), TemperatureBand::Warm);
        assert_eq!(TemperatureBand::classify(35.0), TemperatureBand::Hot);
    }

    #[test]
    fn test_humidity_band_boundaries() {
        assert_eq!(HumidityBand::classify(29.9), HumidityBand::Dry);
        assert_eq!(HumidityBand::classify(30.0), HumidityBand::Comfortable);
        assert_eq!(HumidityBand::classify(60.0), HumidityBand::Humid);
    }

    #[test]
    fn test_gauges_are_clamped() {
        assert_eq!(temperature_gauge(25.0), 50.0);
        assert_eq!(temperature_gauge(80.0), 100.0);
        assert_eq!(temperature_gauge(-3.0), 0.0);
        assert_eq!(humidity_gauge(120.0), 100.0);
        assert_eq!(humidity_gauge(45.0), 45.0);
    }

    #[test]
    fn test_band_display() {
        assert_eq!(TemperatureBand::Hot.to_string(), "Hot");
        assert_eq!(HumidityBand::Comfortable.to_string(), "Comfortable");
    }
}
