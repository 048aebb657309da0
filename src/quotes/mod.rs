//! Commodity quote board
//!
//! Quotes come from an external market-data source behind [`QuoteSource`].
//! A failed lookup degrades that one commodity to missing values; it never
//! aborts the board.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{NowcastError, Result};

/// Commodity name and futures symbol, in display order
pub const DEFAULT_BOARD: [(&str, &str); 11] = [
    ("Rice", "ZR=F"),
    ("Wheat", "ZW=F"),
    ("Maize", "ZC=F"),
    ("Soybeans", "ZS=F"),
    ("Soybean Oil", "ZL=F"),
    ("Soybean Meal", "ZM=F"),
    ("Sugar", "SB=F"),
    ("Beef", "LE=F"),
    ("Oranges", "OJ=F"),
    ("Coffee", "KC=F"),
    ("Cocoa", "CC=F"),
];

/// What a source returns for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawQuote {
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
}

/// Market-data lookup by symbol
pub trait QuoteSource {
    fn fetch(&self, symbol: &str) -> Result<RawQuote>;
}

/// A board entry after degradation rules are applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityQuote {
    pub name: String,
    pub symbol: String,
    /// Last price, falling back to the previous close
    pub price: Option<f64>,
    /// Percent change against the previous close
    pub change_pct: Option<f64>,
}

impl CommodityQuote {
    fn unavailable(name: &str, symbol: &str) -> Self {
        Self { name: name.to_string(), symbol: symbol.to_string(), price: None, change_pct: None }
    }

    fn from_raw(name: &str, symbol: &str, raw: RawQuote) -> Self {
        let price = raw.last_price.or(raw.previous_close);
        let change_pct = match (price, raw.previous_close) {
            (Some(p), Some(prev)) if p != 0.0 && prev != 0.0 => Some((p - prev) / prev * 100.0),
            _ => None,
        };
        Self { name: name.to_string(), symbol: symbol.to_string(), price, change_pct }
    }
}

/// Look up every `(name, symbol)` pair, degrading failures to missing values
pub fn collect_quotes<S: QuoteSource + ?Sized>(source: &S, board: &[(&str, &str)]) -> Vec<CommodityQuote> {
    board
        .iter()
        .map(|(name, symbol)| match source.fetch(symbol) {
            Ok(raw) => {
                debug!("Quote {} ({}): {:?}", name, symbol, raw);
                CommodityQuote::from_raw(name, symbol, raw)
            }
            Err(e) => {
                warn!("Quote lookup failed for {}: {}", name, e);
                CommodityQuote::unavailable(name, symbol)
            }
        })
        .collect()
}

/// Quotes held in memory, typically loaded from a saved CSV snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotQuoteSource {
    quotes: HashMap<String, RawQuote>,
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Price", deserialize_with = "csv::invalid_option")]
    price: Option<f64>,
    #[serde(rename = "Previous Close", deserialize_with = "csv::invalid_option")]
    previous_close: Option<f64>,
}

impl SnapshotQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, quote: RawQuote) {
        self.quotes.insert(symbol.to_string(), quote);
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Read `Symbol,Price,Previous Close` rows
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut source = Self::new();
        for row in rdr.deserialize() {
            let row: SnapshotRow = row?;
            source.insert(&row.symbol, RawQuote { last_price: row.price, previous_close: row.previous_close });
        }
        Ok(source)
    }
}

impl QuoteSource for SnapshotQuoteSource {
    fn fetch(&self, symbol: &str) -> Result<RawQuote> {
        self.quotes.get(symbol).copied().ok_or_else(|| NowcastError::Quote {
            symbol: symbol.to_string(),
            message: "not in snapshot".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    struct Flaky;

    impl QuoteSource for Flaky {
        fn fetch(&self, symbol: &str) -> Result<RawQuote> {
            if symbol == "ZW=F" {
                Err(NowcastError::Quote { symbol: symbol.into(), message: "timeout".into() })
            } else {
                Ok(RawQuote { last_price: Some(110.0), previous_close: Some(100.0) })
            }
        }
    }

    #[test]
    fn test_failure_degrades_single_item() {
        let board = collect_quotes(&Flaky, &DEFAULT_BOARD);
        assert_eq!(board.len(), 11);

        let wheat = board.iter().find(|q| q.name == "Wheat").unwrap();
        assert_eq!(wheat.price, None);
        assert_eq!(wheat.change_pct, None);

        let rice = &board[0];
        assert_eq!(rice.price, Some(110.0));
        assert_relative_eq!(rice.change_pct.unwrap(), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_price_falls_back_to_previous_close() {
        let q = CommodityQuote::from_raw("Sugar", "SB=F", RawQuote { last_price: None, previous_close: Some(20.0) });
        assert_eq!(q.price, Some(20.0));
        assert_eq!(q.change_pct, Some(0.0));

        let q = CommodityQuote::from_raw("Sugar", "SB=F", RawQuote { last_price: Some(20.0), previous_close: None });
        assert_eq!(q.change_pct, None);
    }

    #[test]
    fn test_snapshot_source() {
        let csv = "Symbol,Price,Previous Close\nZR=F,15.5,15.0\nZC=F,,4.2\n";
        let source = SnapshotQuoteSource::from_reader(Cursor::new(csv)).unwrap();

        assert_eq!(source.fetch("ZR=F").unwrap().last_price, Some(15.5));
        assert_eq!(source.fetch("ZC=F").unwrap().last_price, None);
        assert!(matches!(source.fetch("KC=F"), Err(NowcastError::Quote { .. })));

        let board = collect_quotes(&source, &DEFAULT_BOARD);
        assert_eq!(board.iter().filter(|q| q.price.is_some()).count(), 2);
    }
}
