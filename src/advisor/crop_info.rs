//! Static agronomic reference table.
//!
//! Maps crop names to growing-condition metadata shown alongside a
//! recommendation. Pure lookup: case-insensitive exact match, no fuzzy
//! matching. A miss is `None`; callers render a neutral "no detailed
//! info" message instead of erroring.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Agronomic metadata for one crop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropInfoEntry {
    /// Preferred temperature range, e.g. "20°C - 35°C"
    pub temperature: String,
    /// Preferred soil pH range
    pub ph: String,
    /// Preferred rainfall range
    pub rainfall: String,
    /// Cultivation tips
    pub tips: String,
    /// Time from sowing to harvest
    pub harvest_time: String,
}

/// Immutable crop metadata table, keyed by lowercase crop name.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct CropInfoTable {
    entries: HashMap<String, CropInfoEntry>,
}

impl CropInfoTable {
    /// Build a table from (name, entry) pairs. Keys are lowercased.
    pub fn new(entries: impl IntoIterator<Item = (String, CropInfoEntry)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, entry)| (name.to_lowercase(), entry))
                .collect(),
        }
    }

    /// The built-in table covering the crops the stock classifier knows.
    pub fn builtin() -> Self {
        fn entry(
            temperature: &str,
            ph: &str,
            rainfall: &str,
            tips: &str,
            harvest_time: &str,
        ) -> CropInfoEntry {
            CropInfoEntry {
                temperature: temperature.to_string(),
                ph: ph.to_string(),
                rainfall: rainfall.to_string(),
                tips: tips.to_string(),
                harvest_time: harvest_time.to_string(),
            }
        }

        Self::new([
            (
                "rice".to_string(),
                entry(
                    "20°C - 35°C",
                    "5.5 - 7.0",
                    "100 - 200 cm",
                    "Rice needs plenty of water and warm climate.",
                    "3 - 6 months",
                ),
            ),
            (
                "wheat".to_string(),
                entry(
                    "12°C - 25°C",
                    "6.0 - 7.0",
                    "30 - 90 cm",
                    "Requires cool weather during growth and dry weather for harvest.",
                    "4 - 6 months",
                ),
            ),
            (
                "maize".to_string(),
                entry(
                    "18°C - 27°C",
                    "5.8 - 7.0",
                    "50 - 100 cm",
                    "Requires well-drained fertile soil and moderate rainfall.",
                    "3 - 4 months",
                ),
            ),
            (
                "cotton".to_string(),
                entry(
                    "21°C - 30°C",
                    "5.5 - 7.5",
                    "50 - 100 cm",
                    "Needs black soil rich in lime and moisture.",
                    "6 - 7 months",
                ),
            ),
            (
                "banana".to_string(),
                entry(
                    "26°C - 30°C",
                    "5.5 - 7.0",
                    "100 - 200 cm",
                    "Needs rich, well-drained soil and frequent watering.",
                    "9 - 12 months",
                ),
            ),
        ])
    }

    /// Case-insensitive lookup by crop name.
    pub fn lookup(&self, name: &str) -> Option<&CropInfoEntry> {
        self.entries.get(&name.to_lowercase())
    }

    /// Number of crops in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Crop names in the table, unordered.
    pub fn crop_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
