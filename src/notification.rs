use crate::error::{Ff1Error, Result};
use crate::types::PlayerStatus;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Receiver for player status notifications
///
/// Created by [`crate::Ff1Client::subscribe_player_status`]. The WebSocket
/// stays open until the receiver is dropped or the device closes it.
pub struct PlayerStatusReceiver {
    rx: broadcast::Receiver<PlayerStatus>,
    task: JoinHandle<()>,
}

impl PlayerStatusReceiver {
    /// Connect to a notification WebSocket URL and start forwarding updates
    pub(crate) async fn connect(url: &str) -> Result<Self> {
        tracing::info!("Connecting to {}", url);

        let (ws_stream, _) = connect_async(url).await?;
        let (_write, mut read) = ws_stream.split();
        let (tx, rx) = broadcast::channel(100);

        let task = tokio::spawn(async move {
            while let Some(msg_result) = read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => match serde_json::from_str::<PlayerStatus>(&text) {
                        Ok(status) => {
                            if tx.send(status).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Ignoring malformed player status: {}", e);
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Notification connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// Receive the next player status
    ///
    /// Returns [`Ff1Error::ConnectionClosed`] once the connection is gone.
    pub async fn recv(&mut self) -> Result<PlayerStatus> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => Ff1Error::ConnectionClosed,
            broadcast::error::RecvError::Lagged(n) => {
                Ff1Error::ChannelError(format!("Lagged by {} messages", n))
            }
        })
    }

    /// Try to receive a player status without blocking
    ///
    /// Returns `None` if no message is available.
    pub fn try_recv(&mut self) -> Result<Option<PlayerStatus>> {
        match self.rx.try_recv() {
            Ok(status) => Ok(Some(status)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(Ff1Error::ConnectionClosed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                Err(Ff1Error::ChannelError(format!("Lagged by {} messages", n)))
            }
        }
    }
}

impl Drop for PlayerStatusReceiver {
    fn drop(&mut self) {
        self.task.abort();
    }
}
