// WebSocket client for the live sample channel
use crate::application::sample_sources::{LiveEvent, LiveSource};
use crate::infrastructure::wire::decode_live_frame;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Debug, Clone)]
pub struct WebSocketLiveSource {
    url: String,
}

impl WebSocketLiveSource {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl LiveSource for WebSocketLiveSource {
    fn subscribe(&self) -> BoxStream<'static, LiveEvent> {
        let url = self.url.clone();

        async_stream::stream! {
            tracing::info!("Connecting to live channel at {}", url);

            match connect_async(url.as_str()).await {
                Ok((mut socket, _)) => {
                    yield LiveEvent::Opened;

                    while let Some(message) = socket.next().await {
                        match message {
                            Ok(Message::Text(text)) => match decode_live_frame(&text) {
                                Ok(rows) => {
                                    for row in rows {
                                        yield LiveEvent::Sample(row);
                                    }
                                }
                                Err(e) => {
                                    yield LiveEvent::Malformed { reason: e.to_string() };
                                }
                            },
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(e) => {
                                yield LiveEvent::Error { reason: e.to_string() };
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    yield LiveEvent::Error { reason: e.to_string() };
                }
            }

            yield LiveEvent::Closed;
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::SampleRow;
    use futures::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[tokio::test]
    async fn test_subscribe_yields_lifecycle_and_samples() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            let frames = [
                r#"{"timestamp": 4, "download": -1, "upload": 20, "ping": false}"#,
                "garbage",
                r#"{"timestamps": [5], "download": [88.8], "upload": [null], "ping": [true]}"#,
            ];
            for frame in frames {
                socket.send(Message::Text(frame.to_string())).await.unwrap();
            }
            socket.close(None).await.unwrap();
        });

        let source = WebSocketLiveSource::new(format!("ws://{}/ws", addr));
        let events: Vec<LiveEvent> = source.subscribe().collect().await;

        assert_eq!(events.first(), Some(&LiveEvent::Opened));
        assert_eq!(events.get(1), Some(&LiveEvent::Sample(SampleRow::new(4, None, Some(20.0), false))));
        assert!(matches!(events.get(2), Some(LiveEvent::Malformed { .. })));
        assert_eq!(events.get(3), Some(&LiveEvent::Sample(SampleRow::new(5, Some(88.8), None, true))));
        assert_eq!(events.last(), Some(&LiveEvent::Closed));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error_then_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = WebSocketLiveSource::new(format!("ws://{}/ws", addr));
        let events: Vec<LiveEvent> = source.subscribe().collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LiveEvent::Error { .. }));
        assert_eq!(events[1], LiveEvent::Closed);
    }
}
