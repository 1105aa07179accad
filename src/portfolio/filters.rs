//! Read-only filter/sort pipeline over derived positions
//!
//! Pure predicate + comparator selection; nothing here feeds back into
//! the store.

use clap::ValueEnum;
use std::cmp::Ordering;

use crate::portfolio::types::Position;

/// Sort key for the positions list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Ticker,
    Pl,
    Weight,
    Value,
}

/// Sort direction. The comparators order ticker ascending and the numeric
/// keys descending; `Asc` reverses whatever the comparator produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Case-insensitive substring match on the ticker
    pub search_ticker: String,
    /// Keep positions with P&L% at or above this bound
    pub pl_range_min: Option<f64>,
    /// Keep positions with P&L% at or below this bound
    pub pl_range_max: Option<f64>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search_ticker: String::new(),
            pl_range_min: None,
            pl_range_max: None,
            sort_by: SortKey::Value,
            sort_order: SortOrder::Desc,
        }
    }
}

impl FilterConfig {
    pub fn has_filters(&self) -> bool {
        !self.search_ticker.trim().is_empty()
            || self.pl_range_min.is_some()
            || self.pl_range_max.is_some()
    }
}

/// Counts for the filter header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub filtered: usize,
    pub has_filters: bool,
}

/// Apply the configured filters and sort, leaving the input untouched.
pub fn filter_positions(positions: &[Position], config: &FilterConfig) -> Vec<Position> {
    let search = config.search_ticker.trim().to_lowercase();

    let mut filtered: Vec<Position> = positions
        .iter()
        .filter(|position| {
            search.is_empty() || position.ticker.to_lowercase().contains(&search)
        })
        .filter(|position| {
            config
                .pl_range_min
                .map_or(true, |min| position.unrealized_pl_percent >= min)
        })
        .filter(|position| {
            config
                .pl_range_max
                .map_or(true, |max| position.unrealized_pl_percent <= max)
        })
        .cloned()
        .collect();

    filtered.sort_by(comparator(config.sort_by));
    if config.sort_order == SortOrder::Asc {
        filtered.reverse();
    }

    filtered
}

pub fn filter_stats(positions: &[Position], filtered: &[Position], config: &FilterConfig) -> FilterStats {
    FilterStats {
        total: positions.len(),
        filtered: filtered.len(),
        has_filters: config.has_filters(),
    }
}

fn comparator(key: SortKey) -> fn(&Position, &Position) -> Ordering {
    match key {
        SortKey::Ticker => |a, b| a.ticker.cmp(&b.ticker),
        SortKey::Pl => |a, b| b.unrealized_pl_percent.total_cmp(&a.unrealized_pl_percent),
        SortKey::Weight => |a, b| b.portfolio_weight.total_cmp(&a.portfolio_weight),
        SortKey::Value => |a, b| b.market_value.total_cmp(&a.market_value),
    }
}
