//! Advisory core: fertilizer rules, crop metadata, market board, and the
//! engine that composes them into one recommendation per interaction.

pub mod crop_info;
pub mod engine;
pub mod fertilizer;
pub mod market;

pub use crop_info::{CropInfoEntry, CropInfoTable};
pub use engine::{AdviseRequest, AdvisoryEngine, AdvisoryReport};
pub use fertilizer::{advise, FertilizerAdvice, NutrientLevel};
pub use market::{MarketBoard, MarketQuote};
