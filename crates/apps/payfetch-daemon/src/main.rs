//! payfetchd: the payfetch retrieval provider daemon.
//!
//! Accepts requester connections over TCP, serving retrieval deals for
//! content hosted under a local directory. Pricing and deal limits come
//! from a JSON configuration file, reloaded on SIGHUP.

mod cli;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use payfetch_chain::MockPaymentChain;
use payfetch_provider::{run_connection, DealProvider, EventSink, ProviderEvent};
use payfetch_store::FsContentStore;
use payfetch_types::{DEALS_SNAPSHOT_INTERVAL_MS, DEAL_IDLE_TIMEOUT_MS};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let provider_config = config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let store = FsContentStore::open_with_chunk_size(&args.content_dir, args.chunk_size)
        .with_context(|| format!("opening content dir {}", args.content_dir.display()))?;

    // TODO(wallet): wire a chain-backed PaymentChain once the wallet client
    // lands; until then every voucher is accepted.
    warn!("payment verification is using the accept-all mock chain");
    let chain = MockPaymentChain::new();

    let (events, mut events_rx) = EventSink::channel();
    let provider = Arc::new(
        DealProvider::new(provider_config, Arc::new(store), Arc::new(chain)).with_events(events),
    );

    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            log_event(event);
        }
    });

    let snapshots = provider.clone();
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_millis(DEALS_SNAPSHOT_INTERVAL_MS));
        loop {
            ticker.tick().await;
            snapshots.publish_snapshot();
        }
    });

    let sweeper = provider.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let expired = sweeper.expire_idle_deals(Duration::from_millis(DEAL_IDLE_TIMEOUT_MS));
            if expired > 0 {
                info!(expired, "expired idle deals");
            }
        }
    });

    let reload = provider.clone();
    let config_path = args.config.clone();
    tokio::spawn(async move {
        let Ok(mut hangups) = signal(SignalKind::hangup()) else {
            warn!("SIGHUP handler unavailable, config reload disabled");
            return;
        };
        while hangups.recv().await.is_some() {
            info!(path = %config_path.display(), "SIGHUP received, reloading configuration");
            reload.config().reload(config::load(&config_path));
        }
    });

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    info!(
        listen = %args.listen,
        content_dir = %args.content_dir.display(),
        "provider listening"
    );

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted.context("accepting connection")?;
                debug!(peer = %peer, "inbound connection");
                let provider = provider.clone();
                tokio::spawn(async move {
                    let (reader, writer) = socket.into_split();
                    run_connection(provider, reader, writer).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

fn log_event(event: ProviderEvent) {
    match event {
        ProviderEvent::DealAccepted {
            connection,
            deal,
            cid,
            size,
        } => info!(%connection, %deal, %cid, size, "deal accepted"),
        ProviderEvent::BlocksSent {
            connection,
            deal,
            bytes,
            total_sent,
        } => debug!(%connection, %deal, bytes, total_sent, "blocks sent"),
        ProviderEvent::DealCompleted { connection, deal } => {
            info!(%connection, %deal, "deal completed")
        }
        ProviderEvent::DealFailed {
            connection,
            deal,
            reason,
        } => warn!(%connection, deal = ?deal, reason, "deal failed"),
        ProviderEvent::DealsSnapshot(snapshot) => {
            debug!(deals = snapshot.len(), "ongoing deals snapshot");
            for entry in snapshot {
                debug!(
                    connection = %entry.connection,
                    deal = %entry.deal,
                    cid = %entry.cid,
                    status = %entry.status,
                    size_sent = entry.size_sent,
                    size = entry.size,
                    "ongoing deal"
                );
            }
        }
        _ => {}
    }
}
