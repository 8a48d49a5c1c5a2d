//! # WebSocket Decomposition Engine
//!
//! Live engine backed by the statistics server's WebSocket session. The
//! connection is opened lazily on the first round trip and reused afterwards.
//! A round trip takes the stream out of its slot and only puts it back once
//! the reply has been read, so a failed or cancelled round trip always leaves
//! the slot empty and the next call reconnects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::core::error::{ExploreError, Result};
use crate::core::service::DecompositionEngine;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Request frame sent to the statistics server.
#[derive(Debug, Serialize)]
struct DecomposeRequest<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    id: u64,
    data: &'a str,
}

/// Reply frame. Servers that answer with the bare response text are accepted too.
#[derive(Debug, Deserialize)]
struct DecomposeReply {
    #[serde(default)]
    id: Option<u64>,
    data: String,
}

/// Pull the response text out of a reply frame.
fn extract_reply(text: &str, expected_id: u64) -> Result<String> {
    match serde_json::from_str::<DecomposeReply>(text) {
        Ok(reply) => match reply.id {
            Some(id) if id != expected_id => Err(ExploreError::Protocol(format!(
                "reply id {} does not match request id {}",
                id, expected_id
            ))),
            _ => Ok(reply.data),
        },
        Err(_) => Ok(text.to_string()),
    }
}

pub struct WebSocketEngine {
    url: String,
    stream: Mutex<Option<WsStream>>,
    next_id: AtomicU64,
}

impl WebSocketEngine {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<WsStream> {
        let (stream, response) = connect_async(self.url.as_str()).await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Decomposition engine connection failed");
            ExploreError::Network(format!("cannot connect to {}: {}", self.url, e))
        })?;
        info!(url = %self.url, status = ?response.status(), "Decomposition engine connected");
        Ok(stream)
    }

    /// Read frames until the text reply arrives, answering pings on the way.
    async fn read_reply(stream: &mut WsStream) -> Result<String> {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Ok(text),
                Ok(Message::Binary(bytes)) => {
                    return String::from_utf8(bytes).map_err(|_| {
                        ExploreError::Protocol("binary reply is not valid UTF-8".to_string())
                    });
                }
                Ok(Message::Ping(payload)) => {
                    trace!("Answering server ping");
                    stream
                        .send(Message::Pong(payload))
                        .await
                        .map_err(|e| ExploreError::Network(format!("pong failed: {}", e)))?;
                }
                Ok(Message::Close(frame)) => {
                    return Err(ExploreError::Network(format!(
                        "decomposition engine closed the session: {:?}",
                        frame
                    )));
                }
                Ok(_) => {}
                Err(e) => return Err(ExploreError::Network(format!("read failed: {}", e))),
            }
        }
        Err(ExploreError::Network("decomposition engine stream ended".to_string()))
    }

    /// Ping the idle session every `interval` so the server keeps it open.
    ///
    /// The task holds only a weak reference and exits once the engine is dropped.
    /// A busy session is skipped; a failed ping drops the connection.
    pub fn spawn_keepalive(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let engine: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(engine) = engine.upgrade() else {
                    debug!("Decomposition engine dropped, stopping keep-alive");
                    break;
                };
                let Ok(mut slot) = engine.stream.try_lock() else {
                    continue;
                };
                if let Some(stream) = slot.as_mut() {
                    let stamp = chrono::Utc::now().timestamp_millis().to_string();
                    if let Err(e) = stream.send(Message::Ping(stamp.into_bytes())).await {
                        warn!(error = %e, "Keep-alive ping failed, dropping session");
                        *slot = None;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl DecompositionEngine for WebSocketEngine {
    async fn round_trip(&self, payload: String) -> Result<String> {
        let mut slot = self.stream.lock().await;
        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&DecomposeRequest {
            message_type: "decompose",
            id,
            data: &payload,
        })
        .map_err(|e| ExploreError::Protocol(format!("cannot encode request: {}", e)))?;

        stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| ExploreError::Network(format!("send failed: {}", e)))?;

        let text = Self::read_reply(&mut stream).await?;
        *slot = Some(stream);
        extract_reply(&text, id)
    }

    fn name(&self) -> &'static str {
        "websocket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_frame_shape() {
        let frame = serde_json::to_value(DecomposeRequest {
            message_type: "decompose",
            id: 7,
            data: "2017-01-01,40",
        })
        .unwrap();
        assert_eq!(frame["type"], "decompose");
        assert_eq!(frame["id"], 7);
        assert_eq!(frame["data"], "2017-01-01,40");
    }

    #[test]
    fn test_extract_reply_accepts_envelope_or_bare_text() {
        let envelope = r#"{"id":3,"data":"seasonal:1trend:2"}"#;
        assert_eq!(extract_reply(envelope, 3).unwrap(), "seasonal:1trend:2");

        let bare = "seasonal:1trend:2";
        assert_eq!(extract_reply(bare, 3).unwrap(), bare);
    }

    #[test]
    fn test_extract_reply_rejects_foreign_id() {
        let envelope = r#"{"id":2,"data":"seasonal:1trend:2"}"#;
        assert!(matches!(extract_reply(envelope, 3), Err(ExploreError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        let engine = WebSocketEngine::new("ws://127.0.0.1:1/websocket/");
        let err = engine.round_trip("2017-01-01,1".to_string()).await.unwrap_err();
        assert!(matches!(err, ExploreError::Network(_)));
    }
}
