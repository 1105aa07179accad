//! WebSocket client for the price feed with auto-reconnection

use crate::config::FeedConfig;
use crate::ws::events::{decode_frame, FeedEvent};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("reconnect attempts exhausted before the feed opened")]
    RetriesExhausted,
}

/// Commands accepted by the connection task
#[derive(Debug)]
enum Command {
    Disconnect,
}

/// How one feed session ended
enum SessionEnd {
    /// Caller asked to stop; no reconnect.
    Shutdown,
    /// Transport closed (server close or stream end) after a successful open.
    Closed,
    /// The dial itself failed.
    DialFailed,
}

/// Client for a single persistent feed connection.
///
/// Lifecycle is explicit: create, `connect`, consume `events()`,
/// `disconnect`, discard. Reconnection on transport loss is automatic with
/// exponential backoff (`base × 2^(attempt−1)`), capped at
/// `max_reconnect_attempts` consecutive failures; a successful open resets
/// the counter. Once the cap is hit the client stays down until `connect`
/// is called again.
pub struct StreamClient {
    config: FeedConfig,
    event_tx: broadcast::Sender<FeedEvent>,
    command_tx: Option<mpsc::UnboundedSender<Command>>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    /// Create a client. No I/O happens until `connect`.
    pub fn new(config: FeedConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_buffer_size);
        Self {
            config,
            event_tx,
            command_tx: None,
            task: None,
        }
    }

    /// Get a receiver for feed events. Subscribe before `connect` to
    /// observe the initial `Connected(true)`.
    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_tx.subscribe()
    }

    /// Open the connection. Resolves once the transport reports open.
    ///
    /// An unparsable endpoint is rejected immediately. An unreachable
    /// endpoint is retried under the backoff policy; if every attempt
    /// fails before an open is seen, this resolves with
    /// [`StreamError::RetriesExhausted`].
    pub async fn connect(&mut self) -> Result<(), StreamError> {
        let url = Url::parse(&self.config.url)?;

        // A second connect replaces any previous session outright.
        self.disconnect();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (open_tx, open_rx) = oneshot::channel();
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();

        self.command_tx = Some(command_tx);
        self.task = Some(tokio::spawn(async move {
            connection_task(url, config, command_rx, event_tx, open_tx).await;
        }));

        // The open signal is dropped unsent when the task gives up.
        open_rx.await.map_err(|_| StreamError::RetriesExhausted)
    }

    /// Tear down the transport. Idempotent. A reconnect timer already
    /// pending for this session observes the shutdown and never dials.
    pub fn disconnect(&mut self) {
        if let Some(command_tx) = self.command_tx.take() {
            let _ = command_tx.send(Command::Disconnect);
        }
        self.task = None;
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Delay before reconnect attempt `attempt` (1-based).
fn reconnect_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms * 2u64.pow(attempt - 1))
}

/// Outer connection loop: run sessions, schedule reconnects between them.
async fn connection_task(
    url: Url,
    config: FeedConfig,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: broadcast::Sender<FeedEvent>,
    open_tx: oneshot::Sender<()>,
) {
    let mut open_signal = Some(open_tx);
    let mut attempt: u32 = 0;

    loop {
        let end = run_session(
            &url,
            &mut command_rx,
            &event_tx,
            &mut open_signal,
            &mut attempt,
        )
        .await;

        match end {
            SessionEnd::Shutdown => {
                info!("feed client shut down");
                break;
            }
            SessionEnd::Closed | SessionEnd::DialFailed => {
                if attempt >= config.max_reconnect_attempts {
                    warn!(
                        attempts = attempt,
                        "reconnect attempts exhausted; waiting for an explicit connect"
                    );
                    break;
                }
                attempt += 1;
                let delay = reconnect_delay(config.base_reconnect_delay_ms, attempt);
                debug!(delay_ms = delay.as_millis() as u64, attempt, "scheduling reconnect");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    cmd = command_rx.recv() => {
                        // A disconnect issued while the timer is pending
                        // must not wake up and dial a torn-down client.
                        if matches!(cmd, Some(Command::Disconnect) | None) {
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Dial the feed and pump frames until the session ends.
async fn run_session(
    url: &Url,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    event_tx: &broadcast::Sender<FeedEvent>,
    open_signal: &mut Option<oneshot::Sender<()>>,
    attempt: &mut u32,
) -> SessionEnd {
    debug!(%url, "dialing feed");
    let (ws_stream, _) = match connect_async(url.as_str()).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "feed dial failed");
            let _ = event_tx.send(FeedEvent::Error(e.to_string()));
            let _ = event_tx.send(FeedEvent::Connected(false));
            return SessionEnd::DialFailed;
        }
    };

    info!(%url, "feed connected");
    *attempt = 0;
    if let Some(open_tx) = open_signal.take() {
        let _ = open_tx.send(());
    }
    let _ = event_tx.send(FeedEvent::Connected(true));

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // Frames that fail the decode policy vanish here.
                        if let Some(event) = decode_frame(&text) {
                            let _ = event_tx.send(event);
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("feed closed by server");
                        break;
                    }
                    Some(Ok(_)) => {} // ping/pong/binary are transport noise
                    Some(Err(e)) => {
                        // Errors are surfaced to subscribers but only
                        // closure tears the session down.
                        warn!(error = %e, "feed transport error");
                        let _ = event_tx.send(FeedEvent::Error(e.to_string()));
                    }
                    None => {
                        warn!("feed stream ended");
                        break;
                    }
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(Command::Disconnect) | None => {
                        let _ = write.send(Message::Close(None)).await;
                        let _ = event_tx.send(FeedEvent::Connected(false));
                        return SessionEnd::Shutdown;
                    }
                }
            }
        }
    }

    let _ = event_tx.send(FeedEvent::Connected(false));
    SessionEnd::Closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn reconnect_delay_doubles_from_one_second() {
        let delays: Vec<u64> = (1..=5)
            .map(|attempt| reconnect_delay(1000, attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[tokio::test]
    async fn connect_rejects_unparsable_url() {
        let config = FeedConfig {
            url: "not a url".to_string(),
            ..FeedConfig::default()
        };
        let mut client = StreamClient::new(config);
        assert!(matches!(
            client.connect().await,
            Err(StreamError::UrlParse(_))
        ));
    }

    #[tokio::test]
    async fn connect_gives_up_after_configured_attempts() {
        // Nothing listens on a freshly bound-then-dropped port.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = FeedConfig {
            url: format!("ws://{}", addr),
            base_reconnect_delay_ms: 1,
            max_reconnect_attempts: 2,
            ..FeedConfig::default()
        };
        let mut client = StreamClient::new(config);
        assert!(matches!(
            client.connect().await,
            Err(StreamError::RetriesExhausted)
        ));
    }

    #[tokio::test]
    async fn delivers_decoded_events_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let frames = [
                r#"{"type":"history","data":{"AAPL":[{"date":"2024-01-02","open":154.0,"high":156.0,"low":153.5,"close":155.0}]}}"#,
                r#"{"type":"noise","seq":1}"#,
                r#"{"type":"tick","ticker":"AAPL","price":160.0,"ts":1700000000000}"#,
            ];
            for frame in frames {
                ws.send(Message::Text(frame.to_string().into())).await.unwrap();
            }
            // Keep the socket open until the client closes it.
            while let Some(msg) = ws.next().await {
                if msg.is_err() {
                    break;
                }
            }
        });

        let config = FeedConfig {
            url: format!("ws://{}", addr),
            ..FeedConfig::default()
        };
        let mut client = StreamClient::new(config);
        let mut events = client.events();
        client.connect().await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            FeedEvent::Connected(true)
        ));
        match events.recv().await.unwrap() {
            FeedEvent::History(map) => assert!(map.contains_key("AAPL")),
            other => panic!("expected history event, got {:?}", other),
        }
        // The unknown frame is dropped; the tick comes straight after.
        match events.recv().await.unwrap() {
            FeedEvent::Tick(tick) => {
                assert_eq!(tick.ticker, "AAPL");
                assert_eq!(tick.price, 160.0);
            }
            other => panic!("expected tick event, got {:?}", other),
        }

        client.disconnect();
        assert!(matches!(
            events.recv().await.unwrap(),
            FeedEvent::Connected(false)
        ));
    }
}
