//! Fertilizer recommendation rules.
//!
//! A deterministic rule table over the three macronutrient readings.
//! Each nutrient is classified independently against a fixed optimal band
//! (inclusive at both edges); out-of-band nutrients contribute one
//! recommendation line each, evaluated in nitrogen → phosphorus →
//! potassium order. When all three are inside their bands the advice is a
//! single no-action message, never an empty string.

use crate::types::SoilReading;
use serde::{Deserialize, Serialize};

// ============================================================================
// Thresholds
// ============================================================================

/// Nitrogen optimal band (kg/ha), inclusive.
pub const NITROGEN_BAND: (f64, f64) = (90.0, 120.0);

/// Phosphorus optimal band (kg/ha), inclusive.
pub const PHOSPHORUS_BAND: (f64, f64) = (40.0, 60.0);

/// Potassium optimal band (kg/ha), inclusive.
pub const POTASSIUM_BAND: (f64, f64) = (40.0, 60.0);

/// Message shown when every nutrient is inside its optimal band.
pub const OPTIMAL_MESSAGE: &str =
    "NPK levels are in optimal range. No extra fertilizers needed.";

// ============================================================================
// Classification
// ============================================================================

/// Position of a nutrient reading relative to its optimal band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutrientLevel {
    Low,
    Optimal,
    High,
}

impl NutrientLevel {
    /// Classify a reading against an inclusive band.
    ///
    /// No numeric validation: negative readings classify as `Low` like
    /// any other below-band value.
    pub fn classify(value: f64, band: (f64, f64)) -> Self {
        if value < band.0 {
            NutrientLevel::Low
        } else if value > band.1 {
            NutrientLevel::High
        } else {
            NutrientLevel::Optimal
        }
    }
}

impl std::fmt::Display for NutrientLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutrientLevel::Low => write!(f, "low"),
            NutrientLevel::Optimal => write!(f, "optimal"),
            NutrientLevel::High => write!(f, "high"),
        }
    }
}

// ============================================================================
// Advice
// ============================================================================

/// Structured fertilizer advice for one soil reading.
///
/// `lines` is never empty: it holds one line per out-of-band nutrient in
/// N/P/K order, or the single no-action message when everything is
/// optimal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerAdvice {
    pub nitrogen: NutrientLevel,
    pub phosphorus: NutrientLevel,
    pub potassium: NutrientLevel,
    pub lines: Vec<String>,
}

impl FertilizerAdvice {
    /// Evaluate the rule table for a soil reading.
    pub fn for_reading(soil: &SoilReading) -> Self {
        let nitrogen = NutrientLevel::classify(soil.nitrogen, NITROGEN_BAND);
        let phosphorus = NutrientLevel::classify(soil.phosphorus, PHOSPHORUS_BAND);
        let potassium = NutrientLevel::classify(soil.potassium, POTASSIUM_BAND);

        let mut lines = Vec::new();
        match nitrogen {
            NutrientLevel::Low => {
                lines.push("Nitrogen is low. Use Urea or Ammonium Sulphate.".to_string());
            }
            NutrientLevel::High => {
                lines.push("Nitrogen is high. Avoid nitrogen-rich fertilizers.".to_string());
            }
            NutrientLevel::Optimal => {}
        }
        match phosphorus {
            NutrientLevel::Low => {
                lines.push("Phosphorus is low. Use Single Super Phosphate (SSP).".to_string());
            }
            NutrientLevel::High => {
                lines.push("Phosphorus is high. Avoid over-fertilizing.".to_string());
            }
            NutrientLevel::Optimal => {}
        }
        match potassium {
            NutrientLevel::Low => {
                lines.push("Potassium is low. Use Muriate of Potash (MOP).".to_string());
            }
            NutrientLevel::High => {
                lines.push("Potassium is high. Reduce potash-based fertilizers.".to_string());
            }
            NutrientLevel::Optimal => {}
        }

        if lines.is_empty() {
            lines.push(OPTIMAL_MESSAGE.to_string());
        }

        Self {
            nitrogen,
            phosphorus,
            potassium,
            lines,
        }
    }

    /// True when every nutrient is inside its optimal band.
    pub fn is_optimal(&self) -> bool {
        self.nitrogen == NutrientLevel::Optimal
            && self.phosphorus == NutrientLevel::Optimal
            && self.potassium == NutrientLevel::Optimal
    }

    /// Render as the multi-line recommendation string.
    pub fn summary(&self) -> String {
        self.lines.join("\n")
    }
}

/// Convenience wrapper matching the original advisory call shape.
pub fn advise(n: f64, p: f64, k: f64) -> String {
    FertilizerAdvice::for_reading(&SoilReading {
        nitrogen: n,
        phosphorus: p,
        potassium: k,
    })
    .summary()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_band_returns_single_message() {
        for (n, p, k) in [(90.0, 40.0, 40.0), (120.0, 60.0, 60.0), (105.0, 50.0, 55.0)] {
            let advice = FertilizerAdvice::for_reading(&SoilReading {
                nitrogen: n,
                phosphorus: p,
                potassium: k,
            });
            assert!(advice.is_optimal(), "({n}, {p}, {k}) should be optimal");
            assert_eq!(advice.lines, vec![OPTIMAL_MESSAGE.to_string()]);
            assert_eq!(advice.summary(), OPTIMAL_MESSAGE);
        }
    }

    #[test]
    fn test_low_nitrogen_only() {
        // Phosphorus and potassium sit exactly on the lower band edge
        let advice = advise(50.0, 40.0, 40.0);
        assert_eq!(advice, "Nitrogen is low. Use Urea or Ammonium Sulphate.");
    }

    #[test]
    fn test_all_high_lines_in_order() {
        let advice = FertilizerAdvice::for_reading(&SoilReading {
            nitrogen: 130.0,
            phosphorus: 70.0,
            potassium: 70.0,
        });
        assert_eq!(
            advice.lines,
            vec![
                "Nitrogen is high. Avoid nitrogen-rich fertilizers.".to_string(),
                "Phosphorus is high. Avoid over-fertilizing.".to_string(),
                "Potassium is high. Reduce potash-based fertilizers.".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_low_lines() {
        let advice = FertilizerAdvice::for_reading(&SoilReading {
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
        });
        assert_eq!(advice.nitrogen, NutrientLevel::Low);
        assert_eq!(advice.phosphorus, NutrientLevel::Low);
        assert_eq!(advice.potassium, NutrientLevel::Low);
        assert_eq!(advice.lines.len(), 3);
    }

    #[test]
    fn test_negative_readings_classify_low() {
        assert_eq!(
            NutrientLevel::classify(-5.0, NITROGEN_BAND),
            NutrientLevel::Low
        );
    }

    #[test]
    fn test_mixed_levels() {
        let advice = FertilizerAdvice::for_reading(&SoilReading {
            nitrogen: 100.0,
            phosphorus: 70.0,
            potassium: 30.0,
        });
        assert!(!advice.is_optimal());
        assert_eq!(
            advice.lines,
            vec![
                "Phosphorus is high. Avoid over-fertilizing.".to_string(),
                "Potassium is low. Use Muriate of Potash (MOP).".to_string(),
            ]
        );
    }
}
