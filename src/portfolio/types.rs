//! Portfolio type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ws::events::DailyBar;

/// A roster entry: what we hold. The roster is fixed for the whole
/// session; quantity and cost never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub quantity: f64,
    pub average_price: f64,
    pub total_cost: f64,
}

/// One intraday price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayTick {
    pub timestamp: i64,
    pub price: f64,
}

/// Everything known about one ticker from the feed.
///
/// `previous_price` tracks the price immediately prior to
/// `current_price` once ticks start flowing, not the prior day's close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub previous_price: Option<f64>,
    pub history: Vec<DailyBar>,
    /// Rolling buffer of the most recent ticks, oldest first
    pub intraday_ticks: Vec<IntradayTick>,
    /// Epoch-ms of the last mutation
    pub last_update: i64,
}

/// A holding joined with live pricing. Rebuilt whole on every mutation,
/// never patched field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub quantity: f64,
    pub average_price: f64,
    pub total_cost: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pl: f64,
    pub unrealized_pl_percent: f64,
    pub portfolio_weight: f64,
    pub last_update: i64,
}

/// Aggregate view over all positions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_pl: f64,
    pub total_pl_percent: f64,
    pub intraday_change: f64,
    pub intraday_change_percent: f64,
    pub last_update: i64,
}

/// The read-only snapshot handed to consumers. Always fully derived; a
/// reader never sees positions and summary from different mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioState {
    pub positions: Vec<Position>,
    pub summary: PortfolioSummary,
    pub tickers: BTreeMap<String, TickerSnapshot>,
    pub is_connected: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            summary: PortfolioSummary::default(),
            tickers: BTreeMap::new(),
            is_connected: false,
            is_loading: true,
            error: None,
        }
    }
}
