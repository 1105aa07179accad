//! Wire frame model and decode policy for the price feed

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// One daily OHLC bar from the feed's history payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Per-ticker daily bar series, keyed by ticker symbol
pub type HistoryMap = BTreeMap<String, Vec<DailyBar>>;

/// A single intraday price update
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTick {
    pub ticker: String,
    pub price: f64,
    pub timestamp: i64,
}

/// Events published by the stream client
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Transport opened (true) or closed (false)
    Connected(bool),
    /// Transport-level error; non-fatal, the session keeps running
    Error(String),
    /// Full daily-bar history per ticker
    History(HistoryMap),
    /// One intraday price update
    Tick(PriceTick),
}

/// Raw inbound frame envelope. Fields beyond the discriminator are
/// optional so that required-field validation happens per message kind.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    data: Option<HistoryMap>,
    ticker: Option<String>,
    price: Option<f64>,
    ts: Option<i64>,
}

/// Decode one text frame into a feed event.
///
/// Malformed JSON, unknown `type` values, and frames missing required
/// fields all yield `None`. The feed is tolerated rather than policed:
/// bad frames are dropped without surfacing an error to subscribers.
pub fn decode_frame(text: &str) -> Option<FeedEvent> {
    let frame: RawFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            trace!(error = %e, "dropping undecodable frame");
            return None;
        }
    };

    match frame.kind.as_str() {
        "history" => match frame.data {
            Some(map) => Some(FeedEvent::History(map)),
            None => {
                trace!("dropping history frame without data");
                None
            }
        },
        "tick" => match (frame.ticker, frame.price, frame.ts) {
            (Some(ticker), Some(price), Some(timestamp)) => Some(FeedEvent::Tick(PriceTick {
                ticker,
                price,
                timestamp,
            })),
            _ => {
                trace!("dropping tick frame with missing fields");
                None
            }
        },
        other => {
            trace!(kind = other, "dropping frame with unknown type");
            None
        }
    }
}
