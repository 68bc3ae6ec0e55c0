//! Framed message reading and writing.
//!
//! One message per line, JSON-encoded. Both directions enforce
//! [`MAX_MESSAGE_SIZE`]; an oversized inbound line is a decode error before
//! any parsing happens, so a hostile peer cannot make the reader buffer
//! unbounded data.

use payfetch_types::MAX_MESSAGE_SIZE;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{DecodeError, EncodeError};
use crate::message::{decode_message, encode_message, DealMessage};

/// Reads newline-delimited messages from a byte stream.
pub struct MessageReader<R> {
    inner: BufReader<R>,
    line: String,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Wrap the read half of a connection.
    pub fn new(io: R) -> Self {
        Self {
            inner: BufReader::new(io),
            line: String::new(),
        }
    }

    /// Read the next message.
    ///
    /// Returns `Ok(None)` on clean end-of-stream. Blank lines are skipped.
    /// A line longer than [`MAX_MESSAGE_SIZE`] fails without being parsed.
    pub async fn read(&mut self) -> Result<Option<DealMessage>, DecodeError> {
        loop {
            self.line.clear();
            let mut limited = (&mut self.inner).take(MAX_MESSAGE_SIZE + 1);
            let n = limited.read_line(&mut self.line).await?;
            if n == 0 {
                return Ok(None);
            }
            if n as u64 > MAX_MESSAGE_SIZE {
                return Err(DecodeError::MessageTooLarge {
                    max: MAX_MESSAGE_SIZE as usize,
                });
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return decode_message(trimmed.as_bytes()).map(Some);
        }
    }
}

/// Writes newline-delimited messages to a byte stream.
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    /// Wrap the write half of a connection.
    pub fn new(io: W) -> Self {
        Self { inner: io }
    }

    /// Encode and write one message, flushing the stream.
    pub async fn write(&mut self, msg: &DealMessage) -> Result<(), EncodeError> {
        let mut buf = encode_message(msg)?;
        buf.push(b'\n');
        self.inner.write_all(&buf).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Write one raw line, bypassing encoding.
    ///
    /// Exists so tests can put malformed lines on the wire; the line still
    /// gets its trailing newline and a flush.
    pub async fn write_raw(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(line).await?;
        self.inner.write_all(b"\n").await?;
        self.inner.flush().await
    }

    /// Signal end-of-stream to the peer.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.inner.shutdown().await
    }
}
