//! Service wiring the stream client to the portfolio store
//!
//! Owns the connection lifecycle and the reducer task. Every accepted
//! event mutates the store and publishes a full state clone through a
//! watch channel, so consumers always read a definite prefix of the
//! event stream, never an interleaving.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::portfolio::store::PortfolioStore;
use crate::portfolio::types::{Holding, PortfolioState};
use crate::ws::client::{StreamClient, StreamError};

pub struct PortfolioService {
    client: StreamClient,
    holdings: Vec<Holding>,
    state_tx: Option<watch::Sender<PortfolioState>>,
    state_rx: watch::Receiver<PortfolioState>,
    reducer_task: Option<JoinHandle<()>>,
}

impl PortfolioService {
    pub fn new(config: FeedConfig, holdings: Vec<Holding>) -> Self {
        let client = StreamClient::new(config);
        let (state_tx, state_rx) = watch::channel(PortfolioState::default());
        Self {
            client,
            holdings,
            state_tx: Some(state_tx),
            state_rx,
            reducer_task: None,
        }
    }

    /// Watch handle over the derived state. Each observed value is a
    /// complete snapshot from a single reduction.
    pub fn state(&self) -> watch::Receiver<PortfolioState> {
        self.state_rx.clone()
    }

    /// Spawn the reducer (first call only) and open the feed connection.
    /// Resolves once the transport is open; reconnects after that are
    /// handled inside the client and flow through as events.
    pub async fn start(&mut self) -> Result<(), StreamError> {
        if let Some(state_tx) = self.state_tx.take() {
            // Subscribe before dialing so the initial Connected(true) is
            // not missed.
            let mut events = self.client.events();
            let mut store = PortfolioStore::new(self.holdings.clone());
            self.reducer_task = Some(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            store.apply(event);
                            let _ = state_tx.send(store.state().clone());
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "reducer lagged behind the feed");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                debug!("reducer task finished");
            }));
        }

        self.client.connect().await
    }

    /// Close the connection and stop the reducer. The service is done
    /// after this; create a fresh one to reconnect.
    pub async fn stop(&mut self) {
        self.client.disconnect();
        if let Some(task) = self.reducer_task.take() {
            task.abort();
            let _ = task.await;
        }
        info!("portfolio service stopped");
    }
}
