//! Advisory Engine — composes one crop recommendation per interaction.
//!
//! Resolves the climate inputs (explicit values win, then the first
//! forecast entry for the given city, then the built-in defaults),
//! builds the feature vector in contract order, predicts the crop,
//! evaluates the fertilizer rules, attaches the agronomy entry, and
//! optionally narrates the outcome. Strictly sequential: at most one
//! weather call and one prediction per request, no shared mutable state.

use crate::advisor::crop_info::{CropInfoEntry, CropInfoTable};
use crate::advisor::fertilizer::FertilizerAdvice;
use crate::model::{CropClassifier, PredictError};
use crate::narration::Narrator;
use crate::types::{
    EnvironmentReading, FeatureVector, SoilReading, WeatherSource, DEFAULT_HUMIDITY_PCT,
    DEFAULT_TEMPERATURE_C,
};
use crate::weather::WeatherClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

fn default_ph() -> f64 {
    6.5
}

fn default_rainfall() -> f64 {
    100.0
}

/// One advisory interaction's inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviseRequest {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    /// City used to pre-fill temperature/humidity from the forecast.
    #[serde(default)]
    pub city: Option<String>,
    /// Explicit temperature override (°C). Wins over the forecast.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Explicit humidity override (%). Wins over the forecast.
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default = "default_ph")]
    pub ph: f64,
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,
    /// Narrate the recommendation through the TTS side channel.
    #[serde(default)]
    pub narrate: bool,
}

/// Advisory output rendered by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    /// Predicted crop label.
    pub crop: String,
    /// Structured fertilizer advice.
    pub fertilizer: FertilizerAdvice,
    /// Agronomy entry for the predicted crop, when the table knows it.
    pub crop_info: Option<CropInfoEntry>,
    /// Environment values the prediction actually used.
    pub environment: EnvironmentReading,
    /// Where temperature/humidity came from.
    pub weather_source: WeatherSource,
}

/// Composes advisory reports from injected, startup-built collaborators.
pub struct AdvisoryEngine {
    classifier: Arc<CropClassifier>,
    weather: WeatherClient,
    crop_info: Arc<CropInfoTable>,
    narrator: Narrator,
}

impl AdvisoryEngine {
    pub fn new(
        classifier: Arc<CropClassifier>,
        weather: WeatherClient,
        crop_info: Arc<CropInfoTable>,
        narrator: Narrator,
    ) -> Self {
        Self {
            classifier,
            weather,
            crop_info,
            narrator,
        }
    }

    /// The classifier backing this engine.
    pub fn classifier(&self) -> &CropClassifier {
        &self.classifier
    }

    /// Run one advisory interaction.
    ///
    /// # Errors
    ///
    /// Only [`PredictError`] propagates (malformed feature input). A
    /// failed forecast never fails the request; it falls back to the
    /// default climate values.
    pub async fn advise(&self, request: &AdviseRequest) -> Result<AdvisoryReport, PredictError> {
        let (temperature, humidity, weather_source) = self.resolve_climate(request).await;

        let soil = SoilReading {
            nitrogen: request.nitrogen,
            phosphorus: request.phosphorus,
            potassium: request.potassium,
        };
        let environment = EnvironmentReading {
            temperature,
            humidity,
            ph: request.ph,
            rainfall: request.rainfall,
        };

        let features = FeatureVector::from_readings(&soil, &environment);
        let crop = self.classifier.predict(&features)?;
        let fertilizer = FertilizerAdvice::for_reading(&soil);
        let crop_info = self.crop_info.lookup(&crop).cloned();

        info!(%crop, source = %weather_source, "Advisory composed");

        if request.narrate {
            let mut narration = format!("Recommended crop is {crop}.");
            if let Some(info) = &crop_info {
                narration.push(' ');
                narration.push_str(&info.tips);
            }
            self.narrator.speak(&narration);
        }

        Ok(AdvisoryReport {
            crop,
            fertilizer,
            crop_info,
            environment,
            weather_source,
        })
    }

    /// Resolve the temperature/humidity pair for a request.
    ///
    /// The returned source describes where missing values were filled
    /// from; explicit values always win over any fill.
    async fn resolve_climate(&self, request: &AdviseRequest) -> (f64, f64, WeatherSource) {
        if let (Some(temperature), Some(humidity)) = (request.temperature, request.humidity) {
            return (temperature, humidity, WeatherSource::Reported);
        }

        if let Some(city) = &request.city {
            match self.weather.forecast(city).await {
                Ok(points) => {
                    if let Some(first) = points.first() {
                        return (
                            request.temperature.unwrap_or(first.temperature),
                            request.humidity.unwrap_or(first.humidity),
                            WeatherSource::Forecast(city.clone()),
                        );
                    }
                    debug!(%city, "Forecast returned no entries, using defaults");
                }
                Err(e) => {
                    info!(%city, error = %e, "Forecast unavailable, using default climate");
                }
            }
        }

        (
            request.temperature.unwrap_or(DEFAULT_TEMPERATURE_C),
            request.humidity.unwrap_or(DEFAULT_HUMIDITY_PCT),
            WeatherSource::Default,
        )
    }
}
