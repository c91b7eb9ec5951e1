//! Push channel subscription
//!
//! The order service pushes a full snapshot over WebSocket whenever any
//! table changes. [`PushSubscription`] owns the reader task: it is started
//! by `subscribe()`, stopped by `shutdown()`, and cancelled on drop.
//! Frames are forwarded raw; parsing belongs to the store.

use crate::{ClientError, ClientResult};
use futures::StreamExt;
use tokio::sync::mpsc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Live connection to the push channel
#[derive(Debug)]
pub struct PushSubscription {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PushSubscription {
    /// Connect to `url` and forward every text frame to `tx`.
    ///
    /// Returns once the WebSocket handshake has completed, or fails with
    /// [`ClientError::Push`] if it does not finish within `connect_timeout`.
    /// The reader never reconnects: when the server closes the socket or the
    /// transport fails, the failure is logged and the subscription goes
    /// inactive.
    pub async fn subscribe(
        url: &str,
        connect_timeout: Duration,
        tx: mpsc::Sender<String>,
    ) -> ClientResult<Self> {
        tracing::info!("Connecting to push channel: {}", url);
        let (ws, _response) =
            tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| {
                    ClientError::Push(format!("handshake timed out after {connect_timeout:?}"))
                })?
                .map_err(|e| ClientError::Push(e.to_string()))?;
        tracing::info!("Push channel connected");

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(read_loop(ws, tx, shutdown.clone()));

        Ok(Self {
            shutdown,
            task: Some(task),
        })
    }

    /// Whether the reader task is still running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the reader and wait for it to close the socket
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Push reader task ended abnormally: {}", e);
        }
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn read_loop(mut ws: WsStream, tx: mpsc::Sender<String>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Push channel shutting down");
                let _ = ws.close(None).await;
                break;
            }

            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if tx.send(text.as_str().to_owned()).await.is_err() {
                        // 接收端已关闭
                        tracing::debug!("Push receiver dropped, closing channel");
                        let _ = ws.close(None).await;
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Push channel closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Push channel error: {}", e);
                    break;
                }
                None => {
                    tracing::info!("Push channel stream ended");
                    break;
                }
            }
        }
    }
}
