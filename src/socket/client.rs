use core::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use futures::{Sink, SinkExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::codec::{AnyDelimiterCodecError, Framed};
use tracing::instrument;

use super::codec::IrcLineCodec;
use super::settings::{ConnectionSettings, is_secret};

/// Twitch prepends up to 8K of IRCv3 tags to a 512 byte line
const MAX_LINE_LENGTH: usize = 16 * 1024;

type LineSink = Pin<Box<dyn Sink<String, Error = ClientError> + Send>>;
type LineStream = Pin<Box<dyn Stream<Item = ClientResult<String>> + Send>>;

pub type Writer = Arc<Mutex<LineSink>>;
pub type Reader = Arc<Mutex<LineStream>>;

pub type ClientResult<T> = core::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] AnyDelimiterCodecError),

    #[error(transparent)]
    WebSocket(#[from] tungstenite::Error),

    #[error("connection closed")]
    Closed,
}

/// Line-oriented connection to the chat server
///
/// Both halves sit behind their own lock: the writer can be shared between the session and the
/// console forwarder, and a line is always sent whole before the next one starts.
#[derive(Clone)]
pub struct Client {
    pub writer: Writer,
    pub reader: Reader,
}

impl Client {
    /// Opens a connection to `address`
    ///
    /// `ws://` and `wss://` URLs go over a websocket; anything else is treated as a plain TCP
    /// `host:port` carrying CRLF-terminated lines.
    #[instrument]
    pub async fn connect(address: &str) -> ClientResult<Self> {
        if address.starts_with("ws://") || address.starts_with("wss://") {
            Self::connect_websocket(address).await
        } else {
            Self::connect_tcp(address).await
        }
    }

    async fn connect_tcp(address: &str) -> ClientResult<Self> {
        let stream = TcpStream::connect(address).await?;
        tracing::info!(peer = ?stream.peer_addr().ok(), "tcp connection open");

        let framed = Framed::new(stream, IrcLineCodec::new(MAX_LINE_LENGTH));
        let (sink, lines) = framed.split::<String>();

        Ok(Self::from_parts(sink, lines))
    }

    async fn connect_websocket(url: &str) -> ClientResult<Self> {
        let (socket, _) = connect_async(url).await?;
        tracing::info!(url, "websocket connection open");

        let (sink, frames) = socket.split();
        let sink = sink.with(|line: String| async move { Ok::<_, ClientError>(Message::text(line)) });
        let lines = frames
            .filter_map(|frame| async move { frame_lines(frame) })
            .flat_map(stream::iter);

        Ok(Self::from_parts(sink, lines))
    }

    /// Builds a client over any line sink and line stream
    pub fn from_parts<Si, St>(sink: Si, lines: St) -> Self
    where
        Si: Sink<String, Error = ClientError> + Send + 'static,
        St: Stream<Item = ClientResult<String>> + Send + 'static,
    {
        let sink: LineSink = Box::pin(sink);
        let lines: LineStream = Box::pin(lines);

        Self {
            writer: Arc::new(Mutex::new(sink)),
            reader: Arc::new(Mutex::new(lines)),
        }
    }

    /// Sends the authentication lines
    #[instrument(skip(self))]
    pub async fn open(&self, settings: &ConnectionSettings) -> ClientResult<()> {
        for cmd in settings.auth_commands() {
            self.write(&cmd).await?;
        }

        Ok(())
    }

    /// Send a line outbound to the socket
    pub async fn write(&self, line: &str) -> ClientResult<()> {
        if is_secret(line) {
            tracing::debug!("TX PASS [REDACTED]");
        } else {
            tracing::debug!(line, "TX");
        }

        let mut writer = self.writer.lock().await;
        writer.send(line.to_string()).await
    }

    /// Next inbound line, or `None` once the server has closed the connection
    pub async fn read_line(&self) -> ClientResult<Option<String>> {
        let mut reader = self.reader.lock().await;
        reader.next().await.transpose()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Twitch packs several CRLF-terminated lines into one text frame
fn frame_lines(frame: Result<Message, tungstenite::Error>) -> Option<Vec<ClientResult<String>>> {
    match frame {
        Ok(Message::Text(text)) => Some(
            text.as_str()
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| Ok(line.to_string()))
                .collect(),
        ),

        Ok(Message::Close(reason)) => {
            tracing::info!(reason = ?reason, "websocket close frame");
            None
        }

        Ok(_) => None,
        Err(err) => Some(vec![Err(ClientError::from(err))]),
    }
}
