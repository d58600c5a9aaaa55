//! AgroSense: Crop Decision Support
//!
//! Advisory service for farmers combining a pre-trained crop classifier
//! with rule-based fertilizer advice and external data feeds.
//!
//! ## Architecture
//!
//! - **Advisor**: fertilizer rule table, agronomy metadata, market board,
//!   and the engine composing one recommendation per interaction
//! - **Model**: random-forest inference, artifact persistence, and the
//!   offline trainer behind the `train` subcommand
//! - **Weather / Chat / Narration**: external collaborators behind typed
//!   client boundaries
//! - **API**: axum dashboard surface with a uniform response envelope

pub mod advisor;
pub mod api;
pub mod chat;
pub mod config;
pub mod model;
pub mod narration;
pub mod types;
pub mod weather;

// Re-export the advisory core
pub use advisor::{AdviseRequest, AdvisoryEngine, AdvisoryReport, CropInfoTable, FertilizerAdvice, MarketBoard, NutrientLevel};

// Re-export commonly used types
pub use types::{
    EnvironmentReading, FeatureVector, ForecastPoint, SoilReading, WeatherSource,
    DEFAULT_HUMIDITY_PCT, DEFAULT_TEMPERATURE_C, FEATURE_NAMES, NUM_FEATURES,
};

// Re-export model components
pub use model::{
    load_classifier, ArtifactError, CropClassifier, ModelArtifact, PredictError, TrainOptions,
};

// Re-export client boundaries
pub use chat::{ChatBackend, ChatError, HttpChatBackend};
pub use narration::Narrator;
pub use weather::{WeatherClient, WeatherError};

// Re-export configuration
pub use config::AppConfig;
