// src/realtime/poll.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::gateway::{BucketKind, GatePassGateway};
use crate::models::Stage;
use crate::realtime::{ChannelEvent, InProcessChannel, EVENT_BULK_UPDATE};

/// Fallback transport for deployments without the push channel: watch the
/// pending total for a stage and synthesize a bulk-update event whenever it
/// changes. The bridge downstream debounces exactly as it would for pushed
/// events.
pub struct PollAdapter {
    gateway: Arc<dyn GatePassGateway>,
    channel: Arc<InProcessChannel>,
    stage: Stage,
    interval: Duration,
}

impl PollAdapter {
    pub fn new(
        gateway: Arc<dyn GatePassGateway>,
        channel: Arc<InProcessChannel>,
        stage: Stage,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            channel,
            stage,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut known_total: Option<u64> = None;
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    match self
                        .gateway
                        .list_statuses(self.stage, BucketKind::Pending, 1, 0)
                        .await
                    {
                        Ok(page) => {
                            if known_total.is_some_and(|total| total != page.total) {
                                self.channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE));
                            }
                            known_total = Some(page.total);
                        }
                        Err(err) => tracing::warn!(error = %err, "Pending poll failed"),
                    }
                }
            }
        }
    }
}
