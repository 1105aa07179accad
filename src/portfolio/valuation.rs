//! Pure valuation math: roster × ticker snapshots → positions + summary

use chrono::Utc;
use std::collections::BTreeMap;

use crate::portfolio::types::{Holding, PortfolioSummary, Position, TickerSnapshot};

/// Derive positions and the aggregate summary from the fixed roster and
/// the current per-ticker snapshots.
///
/// Two passes over the roster: value and cost sums first, portfolio
/// weights second (the weight denominator is the total from pass one).
/// Holdings with no snapshot yet are omitted, not zero-filled. Positions
/// come out in roster order.
pub fn compute_portfolio(
    holdings: &[Holding],
    tickers: &BTreeMap<String, TickerSnapshot>,
) -> (Vec<Position>, PortfolioSummary) {
    let now = Utc::now().timestamp_millis();
    let mut positions: Vec<Position> = Vec::with_capacity(holdings.len());
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    for holding in holdings {
        let Some(snapshot) = tickers.get(&holding.ticker) else {
            continue;
        };
        let market_value = holding.quantity * snapshot.current_price;
        let unrealized_pl = market_value - holding.total_cost;
        let unrealized_pl_percent = if holding.total_cost > 0.0 {
            unrealized_pl / holding.total_cost * 100.0
        } else {
            0.0
        };
        total_value += market_value;
        total_cost += holding.total_cost;
        positions.push(Position {
            ticker: holding.ticker.clone(),
            quantity: holding.quantity,
            average_price: holding.average_price,
            total_cost: holding.total_cost,
            current_price: snapshot.current_price,
            market_value,
            unrealized_pl,
            unrealized_pl_percent,
            portfolio_weight: 0.0,
            last_update: now,
        });
    }

    if total_value > 0.0 {
        for position in &mut positions {
            position.portfolio_weight = position.market_value / total_value * 100.0;
        }
    }

    let total_pl = total_value - total_cost;
    let total_pl_percent = if total_cost > 0.0 {
        total_pl / total_cost * 100.0
    } else {
        0.0
    };

    // Snapshots without a previous price contribute nothing here but
    // still count toward the value and cost totals.
    let mut intraday_change = 0.0;
    for position in &positions {
        if let Some(snapshot) = tickers.get(&position.ticker) {
            if let Some(previous) = snapshot.previous_price {
                intraday_change += (snapshot.current_price - previous) * position.quantity;
            }
        }
    }

    // The denominator approximates yesterday's closing value. Kept
    // exactly as-is: changing it would alter observable output.
    let intraday_change_percent = if total_value > 0.0 {
        intraday_change / (total_value - intraday_change) * 100.0
    } else {
        0.0
    };

    let summary = PortfolioSummary {
        total_value,
        total_cost,
        total_pl,
        total_pl_percent,
        intraday_change,
        intraday_change_percent,
        last_update: now,
    };

    (positions, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn snapshot(symbol: &str, current: f64, previous: Option<f64>) -> TickerSnapshot {
        TickerSnapshot {
            symbol: symbol.to_string(),
            current_price: current,
            previous_price: previous,
            history: Vec::new(),
            intraday_ticks: Vec::new(),
            last_update: 0,
        }
    }

    fn holding(ticker: &str, quantity: f64, average_price: f64) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            quantity,
            average_price,
            total_cost: quantity * average_price,
        }
    }

    #[test]
    fn derives_position_and_intraday_change() {
        let holdings = vec![holding("AAPL", 100.0, 150.25)];
        let mut tickers = BTreeMap::new();
        tickers.insert("AAPL".to_string(), snapshot("AAPL", 160.0, Some(155.0)));

        let (positions, summary) = compute_portfolio(&holdings, &tickers);

        assert_eq!(positions.len(), 1);
        let position = &positions[0];
        assert!((position.market_value - 16000.0).abs() < EPS);
        assert!((position.unrealized_pl - 975.0).abs() < EPS);
        assert!((position.unrealized_pl_percent - 6.489184692179701).abs() < 1e-6);
        assert!((summary.intraday_change - 500.0).abs() < EPS);
        assert!(
            (summary.intraday_change_percent - 500.0 / (16000.0 - 500.0) * 100.0).abs() < EPS
        );
    }

    #[test]
    fn weights_sum_to_one_hundred() {
        let holdings = vec![
            holding("AAPL", 100.0, 150.0),
            holding("NVDA", 50.0, 420.0),
            holding("TSLA", 75.0, 185.0),
        ];
        let mut tickers = BTreeMap::new();
        tickers.insert("AAPL".to_string(), snapshot("AAPL", 160.0, None));
        tickers.insert("NVDA".to_string(), snapshot("NVDA", 431.0, None));
        tickers.insert("TSLA".to_string(), snapshot("TSLA", 190.0, None));

        let (positions, summary) = compute_portfolio(&holdings, &tickers);

        assert!(summary.total_value > 0.0);
        let weight_sum: f64 = positions.iter().map(|p| p.portfolio_weight).sum();
        assert!((weight_sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_total_value_zeroes_weights_and_percentages() {
        let holdings = vec![holding("AAPL", 100.0, 150.0), holding("NVDA", 50.0, 420.0)];
        let mut tickers = BTreeMap::new();
        tickers.insert("AAPL".to_string(), snapshot("AAPL", 0.0, Some(1.0)));
        tickers.insert("NVDA".to_string(), snapshot("NVDA", 0.0, None));

        let (positions, summary) = compute_portfolio(&holdings, &tickers);

        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.intraday_change_percent, 0.0);
        for position in &positions {
            assert_eq!(position.portfolio_weight, 0.0);
        }
    }

    #[test]
    fn zero_cost_basis_zeroes_pl_percent() {
        let holdings = vec![holding("FREE", 10.0, 0.0)];
        let mut tickers = BTreeMap::new();
        tickers.insert("FREE".to_string(), snapshot("FREE", 5.0, None));

        let (positions, summary) = compute_portfolio(&holdings, &tickers);

        assert_eq!(positions[0].unrealized_pl_percent, 0.0);
        assert_eq!(summary.total_pl_percent, 0.0);
    }

    #[test]
    fn holdings_without_snapshots_are_omitted() {
        let holdings = vec![holding("AAPL", 100.0, 150.0), holding("GHOST", 10.0, 5.0)];
        let mut tickers = BTreeMap::new();
        tickers.insert("AAPL".to_string(), snapshot("AAPL", 160.0, None));

        let (positions, summary) = compute_portfolio(&holdings, &tickers);

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticker, "AAPL");
        // The omitted holding contributes neither value nor cost.
        assert!((summary.total_cost - 15000.0).abs() < EPS);
    }

    #[test]
    fn missing_previous_price_contributes_zero_intraday_change() {
        let holdings = vec![holding("AAPL", 100.0, 150.0), holding("NVDA", 50.0, 420.0)];
        let mut tickers = BTreeMap::new();
        tickers.insert("AAPL".to_string(), snapshot("AAPL", 160.0, Some(155.0)));
        tickers.insert("NVDA".to_string(), snapshot("NVDA", 431.0, None));

        let (_, summary) = compute_portfolio(&holdings, &tickers);

        // Only AAPL moves the intraday number; NVDA still counts in totals.
        assert!((summary.intraday_change - 500.0).abs() < EPS);
        assert!((summary.total_value - (16000.0 + 21550.0)).abs() < EPS);
    }
}
