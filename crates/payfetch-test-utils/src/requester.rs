//! A scripted requester for driving a provider in tests.

use payfetch_types::DealStatus;
use payfetch_wire::{DealMessage, DecodeError, EncodeError, MessageReader, MessageWriter};
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

/// The requester side of an in-memory connection.
///
/// [`TestRequester::connect`] returns the requester plus the raw
/// provider-side halves, ready to hand to the provider's connection loop.
pub struct TestRequester {
    writer: MessageWriter<WriteHalf<DuplexStream>>,
    reader: MessageReader<ReadHalf<DuplexStream>>,
}

impl TestRequester {
    /// Create a connected pair of endpoints.
    pub fn connect() -> (Self, ReadHalf<DuplexStream>, WriteHalf<DuplexStream>) {
        let (client, server) = tokio::io::duplex(1 << 20);
        let (server_rx, server_tx) = tokio::io::split(server);
        let (client_rx, client_tx) = tokio::io::split(client);

        let requester = Self {
            writer: MessageWriter::new(client_tx),
            reader: MessageReader::new(client_rx),
        };
        (requester, server_rx, server_tx)
    }

    /// Send one message to the provider.
    pub async fn send(&mut self, msg: &DealMessage) -> Result<(), EncodeError> {
        self.writer.write(msg).await
    }

    /// Send a raw line, bypassing the codec.
    pub async fn send_raw(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.writer.write_raw(line).await
    }

    /// Receive the provider's next message; `None` when the pipe closed.
    pub async fn recv(&mut self) -> Result<Option<DealMessage>, DecodeError> {
        self.reader.read().await
    }

    /// Receive a message and assert its status.
    ///
    /// Panics (test helper) if the pipe closed or the status differs.
    pub async fn expect_status(&mut self, status: DealStatus) -> DealMessage {
        let msg = self
            .recv()
            .await
            .expect("decode error while awaiting message")
            .expect("pipe closed while awaiting message");
        assert_eq!(msg.status, status, "unexpected status in {msg:?}");
        msg
    }

    /// Close the requester's write half, hanging up mid-session.
    pub async fn hang_up(&mut self) -> std::io::Result<()> {
        self.writer.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payfetch_types::DealId;

    #[tokio::test]
    async fn test_requester_roundtrip() {
        let (mut requester, server_rx, server_tx) = TestRequester::connect();

        // Echo the provider side manually
        let echo = tokio::spawn(async move {
            let mut reader = MessageReader::new(server_rx);
            let mut writer = MessageWriter::new(server_tx);
            while let Ok(Some(msg)) = reader.read().await {
                writer.write(&msg).await.unwrap();
            }
        });

        let msg = DealMessage::accepted(DealId(3));
        requester.send(&msg).await.unwrap();
        assert_eq!(requester.recv().await.unwrap().unwrap(), msg);

        requester.hang_up().await.unwrap();
        echo.await.unwrap();
    }
}
