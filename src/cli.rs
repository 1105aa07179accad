//! Command-line interface

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::config::FeedConfig;
use crate::history::{PortfolioHistory, TimeRange};
use crate::logging;
use crate::portfolio::display;
use crate::portfolio::filters::{self, FilterConfig, SortKey, SortOrder};
use crate::portfolio::roster;
use crate::portfolio::service::PortfolioService;

#[derive(Debug, Parser)]
#[command(
    name = "foliowatch",
    about = "Live portfolio valuation over a streaming price feed"
)]
pub struct Cli {
    /// Feed endpoint (falls back to FEED_URL, then ws://localhost:8081)
    #[arg(long)]
    pub url: Option<String>,

    /// Chart time range
    #[arg(long, value_enum, default_value = "1m")]
    pub range: TimeRange,

    /// Only show positions whose ticker contains this substring
    #[arg(long, default_value = "")]
    pub search: String,

    /// Keep positions with P&L% at or above this bound
    #[arg(long)]
    pub pl_min: Option<f64>,

    /// Keep positions with P&L% at or below this bound
    #[arg(long)]
    pub pl_max: Option<f64>,

    /// Sort key for the positions table
    #[arg(long, value_enum, default_value = "value")]
    pub sort: SortKey,

    /// Sort direction
    #[arg(long, value_enum, default_value = "desc")]
    pub order: SortOrder,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        logging::init()?;

        let mut config = FeedConfig::from_env();
        if let Some(url) = self.url {
            config.url = url;
        }

        let filter = FilterConfig {
            search_ticker: self.search,
            pl_range_min: self.pl_min,
            pl_range_max: self.pl_max,
            sort_by: self.sort,
            sort_order: self.order,
        };

        let mut service = PortfolioService::new(config, roster::default_roster());
        let mut state_rx = service.state();
        service.start().await?;
        info!("connected; streaming until ctrl-c");

        loop {
            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = state_rx.borrow_and_update().clone();
                    if let Some(error) = &state.error {
                        info!(%error, "feed reported an error");
                    }
                    let shown = filters::filter_positions(&state.positions, &filter);
                    let stats = filters::filter_stats(&state.positions, &shown, &filter);
                    print!("{}", display::render_summary(&state.summary));
                    print!("{}", display::render_positions(&shown, &stats));
                    print!("{}", display::render_history(&PortfolioHistory::build(&state, self.range)));
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }

        service.stop().await;
        Ok(())
    }
}
