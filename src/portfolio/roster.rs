//! The fixed position roster

use crate::portfolio::types::Holding;

/// The hard-coded instrument list this session values. Tickers match the
/// symbols the feed publishes history and ticks for.
pub fn default_roster() -> Vec<Holding> {
    [
        ("AAPL", 100.0, 150.25),
        ("NVDA", 50.0, 420.80),
        ("TSLA", 75.0, 185.50),
        ("AMZN", 25.0, 128.30),
        ("MSFT", 80.0, 305.40),
        ("GOOGL", 30.0, 138.75),
        ("META", 45.0, 275.60),
        ("AMD", 120.0, 95.25),
        ("COIN", 35.0, 68.90),
        ("DIS", 60.0, 92.15),
    ]
    .into_iter()
    .map(|(ticker, quantity, average_price)| Holding {
        ticker: ticker.to_string(),
        quantity,
        average_price,
        total_cost: quantity * average_price,
    })
    .collect()
}
