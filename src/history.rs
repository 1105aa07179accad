//! Value-over-time reconstruction for charting
//!
//! Non-"today" ranges replay daily closing bars; "today" replays the
//! intraday tick buffers, falling back to a short historical window when
//! too few real-time ticks have arrived.

use chrono::{TimeZone, Utc};
use clap::ValueEnum;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::portfolio::types::{IntradayTick, PortfolioState, Position, TickerSnapshot};
use crate::ws::events::DailyBar;

/// Distinct intraday timestamps required before "today" is charted from
/// ticks rather than the historical fallback
pub const INTRADAY_MIN_TIMESTAMPS: usize = 5;

const INTRADAY_FALLBACK_DAYS: usize = 7;

/// Selectable chart window
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    #[value(name = "today")]
    Today,
    #[value(name = "1w")]
    Week,
    #[value(name = "1m")]
    Month,
    #[value(name = "2m")]
    TwoMonths,
}

impl TimeRange {
    /// Day-bar window for historical reconstruction
    pub fn days(self) -> usize {
        match self {
            TimeRange::Week => 7,
            TimeRange::TwoMonths => 60,
            // "today" normally goes through the intraday path; 30 days is
            // the catch-all window for everything else.
            TimeRange::Month | TimeRange::Today => 30,
        }
    }
}

/// One charted sample. Produced on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
}

/// Min/max/range over a point series
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChartStats {
    pub min_value: f64,
    pub max_value: f64,
    pub value_range: f64,
}

impl ChartStats {
    pub fn from_points(points: &[ChartPoint]) -> Self {
        let mut values = points.iter().map(|p| p.value);
        let Some(first) = values.next() else {
            return Self::default();
        };
        let (min_value, max_value) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self {
            min_value,
            max_value,
            value_range: max_value - min_value,
        }
    }
}

/// Chart-ready bundle for one selected range.
///
/// `has_error` separates "empty because there are no positions" from
/// "empty despite positions being present".
#[derive(Debug, Clone)]
pub struct PortfolioHistory {
    pub points: Vec<ChartPoint>,
    pub stats: ChartStats,
    pub is_loading: bool,
    pub has_error: bool,
}

impl PortfolioHistory {
    pub fn build(state: &PortfolioState, range: TimeRange) -> Self {
        let points = portfolio_history(&state.tickers, &state.positions, range);
        let stats = ChartStats::from_points(&points);
        let is_loading = state.tickers.is_empty();
        let has_error = points.is_empty() && !state.positions.is_empty() && !is_loading;
        Self {
            points,
            stats,
            is_loading,
            has_error,
        }
    }
}

/// Reconstruct the portfolio value series for `range`, oldest first.
///
/// The first snapshot in the map serves as the reference ticker; its bar
/// dates label the series. Anything that cannot be reconstructed degrades
/// to an empty series rather than an error.
pub fn portfolio_history(
    tickers: &BTreeMap<String, TickerSnapshot>,
    positions: &[Position],
    range: TimeRange,
) -> Vec<ChartPoint> {
    if positions.is_empty() {
        return Vec::new();
    }
    let Some(reference) = tickers.values().next().map(|s| s.history.as_slice()) else {
        return Vec::new();
    };
    if reference.is_empty() {
        return Vec::new();
    }

    match range {
        TimeRange::Today => intraday_history(tickers, positions, reference),
        _ => daily_history(tickers, positions, reference, range.days()),
    }
}

fn daily_history(
    tickers: &BTreeMap<String, TickerSnapshot>,
    positions: &[Position],
    reference: &[DailyBar],
    days: usize,
) -> Vec<ChartPoint> {
    let start = reference.len().saturating_sub(days);
    let mut points = Vec::with_capacity(reference.len() - start);

    for index in start..reference.len() {
        let mut value = 0.0;
        for position in positions {
            // Raw index lookup across tickers; a ticker whose history is
            // shorter simply skips this index. Known limitation: indices
            // are not matched on calendar date.
            if let Some(bar) = tickers
                .get(&position.ticker)
                .and_then(|s| s.history.get(index))
            {
                value += bar.close * position.quantity;
            }
        }
        points.push(ChartPoint {
            date: reference[index].date.clone(),
            value,
        });
    }

    points
}

fn intraday_history(
    tickers: &BTreeMap<String, TickerSnapshot>,
    positions: &[Position],
    reference: &[DailyBar],
) -> Vec<ChartPoint> {
    let mut timestamps = BTreeSet::new();
    for position in positions {
        if let Some(snapshot) = tickers.get(&position.ticker) {
            for tick in &snapshot.intraday_ticks {
                timestamps.insert(tick.timestamp);
            }
        }
    }

    if timestamps.len() < INTRADAY_MIN_TIMESTAMPS {
        return daily_history(tickers, positions, reference, INTRADAY_FALLBACK_DAYS);
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for &timestamp in &timestamps {
        let Some(date) = date_label(timestamp) else {
            warn!(timestamp, "unrepresentable tick timestamp; degrading to empty series");
            return Vec::new();
        };
        let mut value = 0.0;
        for position in positions {
            if let Some(snapshot) = tickers.get(&position.ticker) {
                let price = price_at(&snapshot.intraday_ticks, timestamp, snapshot.current_price);
                value += price * position.quantity;
            }
        }
        points.push(ChartPoint { date, value });
    }

    points
}

/// Most recent tick at or before `timestamp`, else the fallback price.
fn price_at(ticks: &[IntradayTick], timestamp: i64, fallback: f64) -> f64 {
    ticks
        .iter()
        .rev()
        .find(|tick| tick.timestamp <= timestamp)
        .map(|tick| tick.price)
        .unwrap_or(fallback)
}

fn date_label(timestamp: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}
