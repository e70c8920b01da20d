// WebSocket client for the game server connection.

use anyhow::Context;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use crate::protocol::{self, ClientMessage};

/// Events emitted by the WebSocket client to the application layer.
#[derive(Debug, PartialEq)]
pub enum WsEvent {
    /// The connection to the server is established.
    Connected { url: String },
    /// The connection closed, failed, or could not be opened.
    Disconnected,
    /// A text message was received from the server (raw JSON string).
    Message(String),
}

/// Connect to `url` and shuttle frames until the connection ends.
///
/// Inbound text frames are forwarded through `tx`; messages received on
/// `out_rx` are encoded and written as text frames. Exactly one
/// [`WsEvent::Disconnected`] is sent when the connection is over, including
/// when the initial connect fails. There is no reconnection.
pub async fn run(
    url: &str,
    tx: mpsc::Sender<WsEvent>,
    out_rx: mpsc::Receiver<ClientMessage>,
) -> anyhow::Result<()> {
    info!("Connecting to {url}");
    let ws_stream = match tokio_tungstenite::connect_async(url).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            let _ = tx.send(WsEvent::Disconnected).await;
            return Err(e).with_context(|| format!("failed to connect to {url}"));
        }
    };
    info!("Connected to {url}");

    if tx
        .send(WsEvent::Connected {
            url: url.to_string(),
        })
        .await
        .is_err()
    {
        return Ok(());
    }

    let (write, read) = ws_stream.split();
    if pump(read, write, out_rx, &tx, url).await.is_err() {
        return Ok(());
    }

    let _ = tx.send(WsEvent::Disconnected).await;
    Ok(())
}

/// Move frames in both directions until the read side ends or the outbound
/// channel closes. Returns `Err(())` if the event channel is closed
/// (receiver dropped), signalling the caller to stop.
///
/// Generic over the stream and sink so it can be tested with in-memory
/// streams without opening TCP ports.
pub async fn pump<St, Si>(
    mut read: St,
    mut write: Si,
    mut out_rx: mpsc::Receiver<ClientMessage>,
    tx: &mpsc::Sender<WsEvent>,
    peer: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
    Si: Sink<Message> + Unpin,
    Si::Error: std::fmt::Display,
{
    loop {
        tokio::select! {
            msg_result = read.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsEvent::Message(text.to_string())).await.is_err() {
                            return Err(());
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Server {peer} sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {peer}: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ignore Binary, Ping, Pong, Frame variants.
                    }
                    None => {
                        info!("Connection to {peer} ended");
                        break;
                    }
                }
            }

            outbound = out_rx.recv() => {
                match outbound {
                    Some(message) => {
                        let json = match protocol::encode(&message) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("Failed to encode {:?}: {}", message, e);
                                continue;
                            }
                        };
                        debug!("Sending {json}");
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            warn!("Failed to send to {peer}: {e}");
                            break;
                        }
                    }
                    None => {
                        info!("Outbound channel closed, closing connection to {peer}");
                        let _ = write.close().await;
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
