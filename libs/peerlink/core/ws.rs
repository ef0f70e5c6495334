//! WebSocket transport backed by tokio-tungstenite

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::traits::*;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Connector`] that opens a WebSocket (ws:// or wss://)
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

struct WsSink {
    write: SplitSink<WsStream, Message>,
}

struct WsFrames {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| PeerLinkError::WebSocket(e.to_string()))?;
        debug!("WebSocket handshake with {} complete", url);

        let (write, read) = ws_stream.split();
        Ok((Box::new(WsSink { write }), Box::new(WsFrames { read })))
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<()> {
        self.write
            .send(frame_to_tungstenite(frame))
            .await
            .map_err(|e| PeerLinkError::WebSocket(e.to_string()))
    }

    async fn close(&mut self, code: u16) -> Result<()> {
        let close = CloseFrame {
            code: CloseCode::from(code),
            reason: "".into(),
        };
        self.write
            .send(Message::Close(Some(close)))
            .await
            .map_err(|e| PeerLinkError::WebSocket(e.to_string()))
    }
}

#[async_trait]
impl FrameStream for WsFrames {
    async fn next_inbound(&mut self) -> Option<Result<Inbound>> {
        loop {
            let msg = match self.read.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(PeerLinkError::WebSocket(e.to_string()))),
            };

            match msg {
                Message::Text(text) => return Some(Ok(Inbound::Frame(Frame::Text(text)))),
                Message::Binary(data) => return Some(Ok(Inbound::Frame(Frame::Binary(data)))),
                Message::Close(frame) => {
                    let code = frame.map_or(CLOSE_NO_STATUS, |f| u16::from(f.code));
                    return Some(Ok(Inbound::Close(code)));
                }
                // Pings are answered by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

/// Convert Frame to tungstenite Message
fn frame_to_tungstenite(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(data) => Message::Binary(data),
    }
}
