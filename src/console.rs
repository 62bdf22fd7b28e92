use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::socket::{Client, ClientError};

pub const BANNER: &str = "

For IRC protocol description, read rfc1459: https://tools.ietf.org/html/rfc1459
Some basics:

\tJOIN    <channel>{,<channel>} [<key>{,<key>}]
\tPRIVMSG <receiver>{,<receiver>} <text to be sent>
\tPART    <channel>{,<channel>}

";

pub type ConsoleResult<T> = core::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Forwards operator lines to the server verbatim
///
/// Lines are trimmed and blank ones skipped. End of input stops forwarding without ending the
/// session; read and write failures are returned to the caller. Returns the number of lines
/// sent.
#[instrument(skip_all)]
pub async fn forward_lines<R>(input: R, client: Client, cancel: CancellationToken) -> ConsoleResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut forwarded = 0;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = lines.next_line() => next?,
        };

        let Some(line) = next else {
            tracing::info!(forwarded, "console input closed");
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        client.write(line).await?;
        forwarded += 1;
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use futures::SinkExt;
    use futures::stream;
    use tokio::io::BufReader;

    use super::*;

    fn channel_client() -> (Client, futures::channel::mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = futures::channel::mpsc::unbounded::<String>();
        let client = Client::from_parts(
            tx.sink_map_err(|_| ClientError::Closed),
            stream::pending::<Result<String, ClientError>>(),
        );

        (client, rx)
    }

    #[tokio::test]
    async fn test_forwards_trimmed_lines() {
        let (client, rx) = channel_client();
        let input = BufReader::new(&b"  JOIN #other  \n\n   \r\nPRIVMSG #other :hello there\n"[..]);

        let sent = forward_lines(input, client, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(sent, 2);

        let lines: Vec<String> = rx.collect().await;
        assert_eq!(lines, vec!["JOIN #other", "PRIVMSG #other :hello there"]);
    }

    #[tokio::test]
    async fn test_write_failure_is_an_error() {
        let (client, rx) = channel_client();
        drop(rx);

        let input = BufReader::new(&b"PART #chan\n"[..]);
        let res = forward_lines(input, client, CancellationToken::new()).await;

        assert!(matches!(res, Err(ConsoleError::Client(ClientError::Closed))));
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let (client, _rx) = channel_client();
        let (_keep_open, reader) = tokio::io::duplex(64);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let sent = forward_lines(BufReader::new(reader), client, cancel)
            .await
            .unwrap();
        assert_eq!(sent, 0);
    }
}
