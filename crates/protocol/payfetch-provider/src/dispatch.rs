//! Per-connection message dispatch.
//!
//! One task per connection reads messages in arrival order and hands each to
//! the provider; a companion task drains the connection's sink onto the
//! transport. Failure policy is fail-fast: the first handler error, decode
//! error, or peer disconnect closes the sink, removes the connection's
//! deals, and ends both tasks. Other connections are unaffected.

use std::sync::Arc;

use payfetch_wire::{MessageReader, MessageWriter};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, warn};

use crate::provider::DealProvider;
use crate::sink::{MessageSink, SinkDrain};

/// Serve one connection until it completes, fails, or the peer hangs up.
pub async fn run_connection<R, W>(provider: Arc<DealProvider>, reader: R, writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let connection = provider.next_connection_id();
    let (sink, drain) = MessageSink::channel();
    let writer_task = tokio::spawn(write_loop(drain, MessageWriter::new(writer)));

    debug!(connection = %connection, "connection attached");

    let mut reader = MessageReader::new(reader);
    loop {
        match reader.read().await {
            Ok(Some(msg)) => {
                debug!(
                    connection = %connection,
                    deal = %msg.deal_id,
                    status = %msg.status,
                    "inbound message"
                );
                if let Err(e) = provider.handle_message(connection, msg, &sink).await {
                    if e.is_policy_rejection() || e.is_protocol_violation() {
                        warn!(connection = %connection, error = %e, "rejecting deal message, closing pipe");
                    } else {
                        error!(connection = %connection, error = %e, "deal message failed, closing pipe");
                    }
                    break;
                }
                // Deal completion closes the sink; the exchange is over
                if sink.is_closed() {
                    debug!(connection = %connection, "sink closed, ending session");
                    break;
                }
            }
            Ok(None) => {
                debug!(connection = %connection, "peer closed the stream");
                break;
            }
            Err(e) => {
                warn!(connection = %connection, error = %e, "failed to decode inbound message, closing pipe");
                break;
            }
        }
    }

    sink.close();
    let removed = provider.remove_connection(connection);
    if removed > 0 {
        debug!(connection = %connection, deals = removed, "dropped deals on connection teardown");
    }
    // Let the writer flush whatever was queued before the close
    let _ = writer_task.await;
}

async fn write_loop<W>(mut drain: SinkDrain, mut writer: MessageWriter<W>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = drain.next().await {
        if let Err(e) = writer.write(&msg).await {
            warn!(error = %e, "outbound write failed");
            break;
        }
    }
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::provider::DealProvider;
    use payfetch_chain::MockPaymentChain;
    use payfetch_store::MemoryContentStore;
    use payfetch_types::{Cid, DealId, DealProposal, DealStatus, WalletAddr};
    use payfetch_wire::DealMessage;
    use tokio::io::{AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

    fn provider_with_content(content: &[u8]) -> (Arc<DealProvider>, Cid) {
        let store = MemoryContentStore::with_chunk_size(100).unwrap();
        let cid = store.insert(content);
        let config = ProviderConfig::new(WalletAddr::new("f1provider"))
            .with_payment_interval(500)
            .with_payment_interval_increase(100)
            .with_wildcard_price(1)
            .with_content(cid.clone(), content.len() as u64);
        let provider = DealProvider::new(
            config,
            Arc::new(store),
            Arc::new(MockPaymentChain::new()),
        );
        (Arc::new(provider), cid)
    }

    type ClientSide = (
        MessageWriter<WriteHalf<DuplexStream>>,
        MessageReader<ReadHalf<DuplexStream>>,
    );

    fn attach(provider: Arc<DealProvider>) -> (ClientSide, tokio::task::JoinHandle<()>) {
        let (client, server) = tokio::io::duplex(1 << 20);
        let (server_rx, server_tx) = tokio::io::split(server);
        let (client_rx, client_tx) = tokio::io::split(client);

        let handle = tokio::spawn(run_connection(provider, server_rx, server_tx));
        (
            (MessageWriter::new(client_tx), MessageReader::new(client_rx)),
            handle,
        )
    }

    fn proposal(cid: &Cid, size: u64) -> DealMessage {
        DealMessage::proposal(
            DealId(1),
            cid.clone(),
            DealProposal {
                wallet: WalletAddr::new("f1provider"),
                size,
                price_per_byte: 1,
                payment_interval: 500,
                payment_interval_increase: 100,
            },
        )
    }

    #[tokio::test]
    async fn test_accepts_over_the_wire() {
        let (provider, cid) = provider_with_content(&[1u8; 1000]);
        let ((mut writer, mut reader), _handle) = attach(provider.clone());

        writer.write(&proposal(&cid, 1000)).await.unwrap();

        let response = reader.read().await.unwrap().unwrap();
        assert_eq!(response.status, DealStatus::Accepted);
        assert_eq!(provider.deal_count(), 1);
    }

    #[tokio::test]
    async fn test_bogus_status_closes_pipe_without_state_change() {
        let (provider, _cid) = provider_with_content(&[1u8; 1000]);
        let ((mut writer, mut reader), handle) = attach(provider.clone());

        writer
            .write(
                &serde_json::from_str::<DealMessage>(r#"{"dealId":9,"status":"bogus"}"#).unwrap(),
            )
            .await
            .unwrap();

        // Pipe ends without any response
        assert!(reader.read().await.unwrap().is_none());
        handle.await.unwrap();
        assert_eq!(provider.deal_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_line_closes_pipe() {
        let (provider, _cid) = provider_with_content(&[1u8; 1000]);
        let (client, server) = tokio::io::duplex(4096);
        let (server_rx, server_tx) = tokio::io::split(server);
        let (client_rx, mut client_tx) = tokio::io::split(client);

        let handle = tokio::spawn(run_connection(provider, server_rx, server_tx));

        client_tx.write_all(b"this is not json\n").await.unwrap();

        let mut reader = MessageReader::new(client_rx);
        assert!(reader.read().await.unwrap().is_none());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_peer_disconnect_drops_deals() {
        let (provider, cid) = provider_with_content(&[1u8; 1000]);
        let ((mut writer, mut reader), handle) = attach(provider.clone());

        writer.write(&proposal(&cid, 1000)).await.unwrap();
        assert_eq!(
            reader.read().await.unwrap().unwrap().status,
            DealStatus::Accepted
        );
        assert_eq!(provider.deal_count(), 1);

        // Hang up mid-deal
        writer.shutdown().await.unwrap();
        handle.await.unwrap();
        assert_eq!(provider.deal_count(), 0);
    }

    #[tokio::test]
    async fn test_rejection_closes_pipe_but_not_other_connections() {
        let (provider, cid) = provider_with_content(&[1u8; 1000]);

        // First connection holds a healthy deal
        let ((mut writer1, mut reader1), _handle1) = attach(provider.clone());
        writer1.write(&proposal(&cid, 1000)).await.unwrap();
        assert_eq!(
            reader1.read().await.unwrap().unwrap().status,
            DealStatus::Accepted
        );

        // Second connection offers an unhosted cid and is torn down
        let ((mut writer2, mut reader2), handle2) = attach(provider.clone());
        writer2
            .write(&proposal(&Cid::new("bafy-unhosted"), 1000))
            .await
            .unwrap();
        assert!(reader2.read().await.unwrap().is_none());
        handle2.await.unwrap();

        // The first connection's deal survives
        assert_eq!(provider.deal_count(), 1);
    }
}
