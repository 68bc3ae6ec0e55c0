//! Outbound message sink.
//!
//! Each connection gets one sink: an unbounded queue of outgoing messages
//! paired with an explicit end-of-stream signal. Deals hold clones of their
//! connection's sink and push responses through it; a writer task drains the
//! other end onto the transport. Closing is idempotent and makes every
//! further push a no-op, so a deal that races connection teardown cannot
//! resurrect the pipe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use payfetch_wire::DealMessage;
use tokio::sync::mpsc;
use tracing::debug;

enum SinkCommand {
    Message(Box<DealMessage>),
    Close,
}

/// The push side of a connection's outbound queue.
#[derive(Clone, Debug)]
pub struct MessageSink {
    tx: mpsc::UnboundedSender<SinkCommand>,
    closed: Arc<AtomicBool>,
}

impl MessageSink {
    /// Create a sink and the drain feeding the connection's writer task.
    pub fn channel() -> (MessageSink, SinkDrain) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = MessageSink {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        };
        (sink, SinkDrain { rx })
    }

    /// Queue a message for the peer.
    ///
    /// Messages pushed after [`MessageSink::close`] are dropped.
    pub fn send(&self, msg: DealMessage) {
        if self.closed.load(Ordering::Acquire) {
            debug!(deal = %msg.deal_id, status = %msg.status, "dropping message for closed sink");
            return;
        }
        // A send error means the drain is gone, which only happens after
        // close or writer teardown; dropping matches the closed path.
        let _ = self.tx.send(SinkCommand::Message(Box::new(msg)));
    }

    /// End the outbound stream.
    ///
    /// Idempotent. Messages already queued are still written before the
    /// transport is shut down.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.tx.send(SinkCommand::Close);
    }

    /// Whether the sink has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// The drain side of a connection's outbound queue.
pub struct SinkDrain {
    rx: mpsc::UnboundedReceiver<SinkCommand>,
}

impl SinkDrain {
    /// Receive the next outbound message.
    ///
    /// Returns `None` once the sink is closed (after yielding everything
    /// queued before the close) or every sink handle is dropped.
    pub async fn next(&mut self) -> Option<DealMessage> {
        match self.rx.recv().await {
            Some(SinkCommand::Message(msg)) => Some(*msg),
            Some(SinkCommand::Close) | None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payfetch_types::DealId;

    #[tokio::test]
    async fn test_send_then_drain() {
        let (sink, mut drain) = MessageSink::channel();

        sink.send(DealMessage::accepted(DealId(1)));
        sink.send(DealMessage::completed(DealId(1)));

        assert_eq!(drain.next().await.unwrap().deal_id, DealId(1));
        assert_eq!(
            drain.next().await.unwrap().status,
            payfetch_types::DealStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_close_ends_drain_after_queued_messages() {
        let (sink, mut drain) = MessageSink::channel();

        sink.send(DealMessage::accepted(DealId(1)));
        sink.close();

        // Queued message still delivered, then end-of-stream
        assert!(drain.next().await.is_some());
        assert!(drain.next().await.is_none());
    }

    #[tokio::test]
    async fn test_sends_after_close_are_dropped() {
        let (sink, mut drain) = MessageSink::channel();

        sink.close();
        sink.send(DealMessage::accepted(DealId(1)));

        assert!(drain.next().await.is_none());
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (sink, mut drain) = MessageSink::channel();

        sink.close();
        sink.close();
        sink.close();

        assert!(drain.next().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_close_state() {
        let (sink, mut drain) = MessageSink::channel();
        let clone = sink.clone();

        sink.close();
        assert!(clone.is_closed());

        clone.send(DealMessage::accepted(DealId(2)));
        assert!(drain.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drain_ends_when_all_sinks_dropped() {
        let (sink, mut drain) = MessageSink::channel();
        drop(sink);
        assert!(drain.next().await.is_none());
    }
}
