//! Shared data structures for the crop advisory pipeline
//!
//! This module defines the core types flowing through an advisory request:
//! - SoilReading / EnvironmentReading (user-supplied inputs)
//! - FeatureVector (the classifier's positional input contract)
//! - ForecastPoint (weather provider output)
//! - WeatherSource (provenance of the temperature/humidity actually used)

use serde::{Deserialize, Serialize};

// ============================================================================
// Feature Contract
// ============================================================================

/// Number of features the crop classifier consumes.
pub const NUM_FEATURES: usize = 7;

/// Canonical feature order the classifier was trained on.
///
/// This order is the training contract: it is written into every model
/// artifact and revalidated at load time. A mismatch is a load error,
/// never a silent mis-prediction.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "nitrogen",
    "phosphorus",
    "potassium",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Default temperature used when no forecast is available (°C).
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;

/// Default humidity used when no forecast is available (%).
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

// ============================================================================
// User Inputs
// ============================================================================

/// Soil macronutrient readings (kg/ha).
///
/// Values are expected to be non-negative but are not validated here;
/// the fertilizer thresholds are the only semantic range. Negative
/// readings fall into the "low" advisory branch like any other value
/// below threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoilReading {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Environmental readings for a field.
///
/// pH (0-14) and humidity (0-100) are constrained by the dashboard input
/// widgets only; core logic stays permissive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentReading {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Soil pH
    pub ph: f64,
    /// Rainfall (mm)
    pub rainfall: f64,
}

/// Ordered classifier input, always in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    /// Assemble the classifier input from soil and environment readings.
    pub fn from_readings(soil: &SoilReading, env: &EnvironmentReading) -> Self {
        Self {
            nitrogen: soil.nitrogen,
            phosphorus: soil.phosphorus,
            potassium: soil.potassium,
            temperature: env.temperature,
            humidity: env.humidity,
            ph: env.ph,
            rainfall: env.rainfall,
        }
    }

    /// Flatten into the positional array the trees split on.
    ///
    /// Index i corresponds to `FEATURE_NAMES[i]`.
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

// ============================================================================
// Weather
// ============================================================================

/// One forecast entry from the weather provider.
///
/// Entries keep the provider's order; the client truncates to the first
/// five entries of the forecast window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    /// Formatted timestamp, `YYYY-MM-DD HH:MM` (UTC)
    pub timestamp: String,
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
}

/// Where the temperature/humidity used for a prediction came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "city")]
pub enum WeatherSource {
    /// Caller supplied explicit values.
    Reported,
    /// First entry of the forecast for the named city.
    Forecast(String),
    /// Forecast unavailable; fell back to the built-in defaults.
    #[default]
    Default,
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherSource::Reported => write!(f, "reported"),
            WeatherSource::Forecast(city) => write!(f, "forecast ({city})"),
            WeatherSource::Default => write!(f, "default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_array_matches_contract_order() {
        let soil = SoilReading {
            nitrogen: 1.0,
            phosphorus: 2.0,
            potassium: 3.0,
        };
        let env = EnvironmentReading {
            temperature: 4.0,
            humidity: 5.0,
            ph: 6.0,
            rainfall: 7.0,
        };
        let fv = FeatureVector::from_readings(&soil, &env);
        assert_eq!(fv.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_non_finite_components_detected() {
        let mut fv = FeatureVector {
            nitrogen: 90.0,
            phosphorus: 45.0,
            potassium: 45.0,
            temperature: 25.0,
            humidity: 50.0,
            ph: 6.5,
            rainfall: 100.0,
        };
        assert!(fv.is_finite());
        fv.humidity = f64::NAN;
        assert!(!fv.is_finite());
    }
}
