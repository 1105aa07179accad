//! Event-sourced portfolio state container

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;

use crate::portfolio::types::{Holding, IntradayTick, PortfolioState, TickerSnapshot};
use crate::portfolio::valuation::compute_portfolio;
use crate::ws::events::{FeedEvent, HistoryMap, PriceTick};

/// Most recent intraday ticks kept per ticker; oldest evicted first
pub const INTRADAY_TICK_CAP: usize = 100;

/// Single source of truth for portfolio state.
///
/// Feed events are reduced one at a time; every accepted mutation rebuilds
/// positions and summary from scratch before `apply` returns, so a reader
/// of [`PortfolioStore::state`] never observes partially derived state.
pub struct PortfolioStore {
    holdings: Vec<Holding>,
    state: PortfolioState,
}

impl PortfolioStore {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self {
            holdings,
            state: PortfolioState::default(),
        }
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Apply one feed event.
    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected(connected) => {
                self.state.is_connected = connected;
            }
            FeedEvent::Error(message) => {
                // Stale-but-visible beats an empty screen: existing
                // snapshots and positions stay untouched.
                self.state.error = Some(message);
                self.state.is_loading = false;
            }
            FeedEvent::History(map) => self.apply_history(map),
            FeedEvent::Tick(tick) => self.apply_tick(tick),
        }
    }

    fn apply_history(&mut self, map: HistoryMap) {
        let now = Utc::now().timestamp_millis();
        let mut tickers = BTreeMap::new();

        for (symbol, bars) in map {
            let (current_price, previous_price) = match bars.len() {
                0 => continue,
                1 => (bars[0].close, None),
                n => (bars[n - 1].close, Some(bars[n - 2].close)),
            };
            tickers.insert(
                symbol.clone(),
                TickerSnapshot {
                    symbol,
                    current_price,
                    previous_price,
                    history: bars,
                    intraday_ticks: Vec::new(),
                    last_update: now,
                },
            );
        }

        debug!(tickers = tickers.len(), "history snapshot applied");
        self.state.tickers = tickers;
        self.recompute();
        self.state.is_loading = false;
    }

    fn apply_tick(&mut self, tick: PriceTick) {
        let Some(snapshot) = self.state.tickers.get_mut(&tick.ticker) else {
            debug!(ticker = %tick.ticker, "tick for unknown ticker dropped");
            return;
        };

        // Duplicate price: nothing changed, skip the recompute entirely.
        if snapshot.current_price == tick.price {
            return;
        }

        snapshot.previous_price = Some(snapshot.current_price);
        snapshot.current_price = tick.price;
        snapshot.intraday_ticks.push(IntradayTick {
            timestamp: tick.timestamp,
            price: tick.price,
        });
        if snapshot.intraday_ticks.len() > INTRADAY_TICK_CAP {
            let overflow = snapshot.intraday_ticks.len() - INTRADAY_TICK_CAP;
            snapshot.intraday_ticks.drain(..overflow);
        }
        snapshot.last_update = tick.timestamp;

        self.recompute();
    }

    fn recompute(&mut self) {
        let (positions, summary) = compute_portfolio(&self.holdings, &self.state.tickers);
        self.state.positions = positions;
        self.state.summary = summary;
    }
}
