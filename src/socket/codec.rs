use tokio_util::bytes::BytesMut;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

use super::client::ClientError;

/// CRLF line framing that never gives up on the stream
///
/// Lines are split on `\n` and decoded lossily, so a stray Latin-1 byte from one chatter turns
/// into U+FFFD instead of an error. Over-long lines are dropped up to the next `\n`. Blank lines
/// are skipped. Only socket errors surface.
#[derive(Debug)]
pub struct IrcLineCodec {
    inner: AnyDelimiterCodec,
}

impl IrcLineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\r\n".to_vec(),
                max_length,
            ),
        }
    }
}

fn to_line(chunk: &[u8]) -> String {
    String::from_utf8_lossy(chunk).trim_end_matches('\r').to_string()
}

impl Decoder for IrcLineCodec {
    type Item = String;
    type Error = ClientError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ClientError> {
        loop {
            match self.inner.decode(buf) {
                Ok(Some(chunk)) => {
                    let line = to_line(&chunk);
                    if !line.is_empty() {
                        return Ok(Some(line));
                    }
                }
                Ok(None) => return Ok(None),

                // the inner codec is now discarding up to the next delimiter
                Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                    tracing::warn!(max = self.inner.max_length(), "dropping over-long line");
                }
                Err(AnyDelimiterCodecError::Io(err)) => return Err(err.into()),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ClientError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        match self.inner.decode_eof(buf) {
            Ok(Some(chunk)) => {
                let line = to_line(&chunk);
                Ok((!line.is_empty()).then_some(line))
            }
            Ok(None) | Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(None),
            Err(AnyDelimiterCodecError::Io(err)) => Err(err.into()),
        }
    }
}

impl Encoder<String> for IrcLineCodec {
    type Error = ClientError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ClientError> {
        Ok(self.inner.encode(line, dst)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut IrcLineCodec, input: &[u8]) -> Vec<String> {
        let mut buf = BytesMut::from(input);
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(&mut buf).unwrap() {
            lines.push(line);
        }
        if let Some(line) = codec.decode_eof(&mut buf).unwrap() {
            lines.push(line);
        }

        lines
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut codec = IrcLineCodec::new(512);
        let lines = decode_all(&mut codec, b"PING :a\r\n\r\n:x PRIVMSG #c :hi\nPART");
        assert_eq!(lines, vec!["PING :a", ":x PRIVMSG #c :hi", "PART"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut codec = IrcLineCodec::new(512);
        let lines = decode_all(&mut codec, b"PRIVMSG #chan :caf\xe9\r\nPRIVMSG #chan :b\r\n");
        assert_eq!(lines, vec!["PRIVMSG #chan :caf\u{FFFD}", "PRIVMSG #chan :b"]);
    }

    #[test]
    fn test_over_long_line_is_dropped() {
        let mut codec = IrcLineCodec::new(16);
        let mut input = vec![b'x'; 64];
        input.extend_from_slice(b"\r\nPING :ok\r\n");

        assert_eq!(decode_all(&mut codec, &input), vec!["PING :ok"]);
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = IrcLineCodec::new(512);
        let mut dst = BytesMut::new();
        codec.encode("JOIN #chan".to_string(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"JOIN #chan\r\n");
    }
}
