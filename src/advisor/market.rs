//! Static market price board.
//!
//! Mandi prices for the dashboard's Market Prices module. The board is a
//! fixed table for now; a live market-data feed would replace
//! [`MarketBoard::builtin`] without changing the lookup surface.

use serde::{Deserialize, Serialize};

/// One quoted crop price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketQuote {
    pub crop: String,
    /// Display price, e.g. "₹2000/qtl"
    pub price: String,
}

/// Immutable price board, built once at startup.
#[derive(Debug, Clone)]
pub struct MarketBoard {
    quotes: Vec<MarketQuote>,
}

impl MarketBoard {
    /// The built-in static price list.
    pub fn builtin() -> Self {
        let quotes = [
            ("rice", "₹2000/qtl"),
            ("wheat", "₹2100/qtl"),
            ("maize", "₹1700/qtl"),
        ]
        .into_iter()
        .map(|(crop, price)| MarketQuote {
            crop: crop.to_string(),
            price: price.to_string(),
        })
        .collect();
        Self { quotes }
    }

    /// All quotes in listing order.
    pub fn quotes(&self) -> &[MarketQuote] {
        &self.quotes
    }

    /// Case-insensitive price lookup for one crop.
    pub fn quote(&self, crop: &str) -> Option<&MarketQuote> {
        let wanted = crop.to_lowercase();
        self.quotes.iter().find(|q| q.crop == wanted)
    }
}
