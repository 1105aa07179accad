//! Console rendering for portfolio state

use owo_colors::OwoColorize;

use crate::history::PortfolioHistory;
use crate::portfolio::filters::FilterStats;
use crate::portfolio::types::{PortfolioSummary, Position};

fn signed(value: f64, width: usize) -> String {
    let formatted = format!("{:>width$.2}", value, width = width);
    if value >= 0.0 {
        formatted.green().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Render the aggregate summary as a small table.
pub fn render_summary(summary: &PortfolioSummary) -> String {
    let mut output = String::new();

    output.push_str("┌─────────────────────────┬─────────────────┐\n");
    output.push_str("│ Portfolio               │ Value           │\n");
    output.push_str("├─────────────────────────┼─────────────────┤\n");
    output.push_str(&format!(
        "│ Total Value             │ ${:>14.2} │\n",
        summary.total_value
    ));
    output.push_str(&format!(
        "│ Total Cost              │ ${:>14.2} │\n",
        summary.total_cost
    ));
    output.push_str(&format!(
        "│ Total P&L               │ ${} │\n",
        signed(summary.total_pl, 14)
    ));
    output.push_str(&format!(
        "│ Total P&L %             │ {}% │\n",
        signed(summary.total_pl_percent, 14)
    ));
    output.push_str(&format!(
        "│ Intraday Change         │ ${} │\n",
        signed(summary.intraday_change, 14)
    ));
    output.push_str(&format!(
        "│ Intraday Change %       │ {}% │\n",
        signed(summary.intraday_change_percent, 14)
    ));
    output.push_str("└─────────────────────────┴─────────────────┘\n");

    output
}

/// Render the positions list as a table, one row per position.
pub fn render_positions(positions: &[Position], stats: &FilterStats) -> String {
    if positions.is_empty() {
        return "No positions to show.\n".to_string();
    }

    let mut output = String::new();

    if stats.has_filters {
        output.push_str(&format!(
            "Showing {} of {} positions\n",
            stats.filtered, stats.total
        ));
    }

    output.push_str("┌────────┬──────────┬───────────┬──────────────┬───────────┬─────────┐\n");
    output.push_str("│ Ticker │ Quantity │ Price     │ Market Value │ P&L %     │ Weight  │\n");
    output.push_str("├────────┼──────────┼───────────┼──────────────┼───────────┼─────────┤\n");

    for position in positions {
        output.push_str(&format!(
            "│ {:<6} │ {:>8.0} │ {:>9.2} │ {:>12.2} │ {}% │ {:>6.2}% │\n",
            position.ticker,
            position.quantity,
            position.current_price,
            position.market_value,
            signed(position.unrealized_pl_percent, 8),
            position.portfolio_weight,
        ));
    }

    output.push_str("└────────┴──────────┴───────────┴──────────────┴───────────┴─────────┘\n");

    output
}

/// Render the reconstructed series as a one-line stats summary.
pub fn render_history(history: &PortfolioHistory) -> String {
    if history.is_loading {
        return "Chart: waiting for data...\n".to_string();
    }
    if history.has_error {
        return "Chart: unable to load history\n".to_string();
    }
    if history.points.is_empty() {
        return "Chart: no data\n".to_string();
    }

    let first = &history.points[0];
    let last = &history.points[history.points.len() - 1];
    format!(
        "Chart: {} points, {} → {}, min {:.2}, max {:.2}, range {:.2}\n",
        history.points.len(),
        first.date,
        last.date,
        history.stats.min_value,
        history.stats.max_value,
        history.stats.value_range,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ChartPoint, ChartStats};

    fn position(ticker: &str) -> Position {
        Position {
            ticker: ticker.to_string(),
            quantity: 100.0,
            average_price: 150.25,
            total_cost: 15025.0,
            current_price: 160.0,
            market_value: 16000.0,
            unrealized_pl: 975.0,
            unrealized_pl_percent: 6.49,
            portfolio_weight: 100.0,
            last_update: 0,
        }
    }

    #[test]
    fn renders_positions_table() {
        let positions = vec![position("AAPL")];
        let stats = FilterStats { total: 1, filtered: 1, has_filters: false };
        let table = render_positions(&positions, &stats);
        assert!(table.contains("AAPL"));
        assert!(table.contains("16000.00"));
    }

    #[test]
    fn renders_filter_header_when_filters_active() {
        let positions = vec![position("AAPL")];
        let stats = FilterStats { total: 4, filtered: 1, has_filters: true };
        let table = render_positions(&positions, &stats);
        assert!(table.contains("Showing 1 of 4 positions"));
    }

    #[test]
    fn renders_history_stats_line() {
        let history = PortfolioHistory {
            points: vec![
                ChartPoint { date: "2024-01-01".to_string(), value: 100.0 },
                ChartPoint { date: "2024-01-02".to_string(), value: 120.0 },
            ],
            stats: ChartStats { min_value: 100.0, max_value: 120.0, value_range: 20.0 },
            is_loading: false,
            has_error: false,
        };
        let line = render_history(&history);
        assert!(line.contains("2 points"));
        assert!(line.contains("range 20.00"));
    }

    #[test]
    fn renders_error_and_loading_states() {
        let loading = PortfolioHistory {
            points: Vec::new(),
            stats: ChartStats::default(),
            is_loading: true,
            has_error: false,
        };
        assert!(render_history(&loading).contains("waiting"));

        let failed = PortfolioHistory {
            points: Vec::new(),
            stats: ChartStats::default(),
            is_loading: false,
            has_error: true,
        };
        assert!(render_history(&failed).contains("unable to load"));
    }
}
