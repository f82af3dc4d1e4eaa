use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use spin_core::HeadlineSet;
use crate::pipeline::AnalysisPipeline;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    pub headlines: Option<HeadlineSet>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Consecutive failed refreshes since the last success.
    pub failures: u32,
}

/// Periodically re-fetches headlines in the background.
///
/// A failed refresh is logged and the previous set is kept; callers only
/// ever observe successful fetches.
pub struct HeadlineFeed {
    receiver: watch::Receiver<FeedSnapshot>,
    handle: JoinHandle<()>,
}

impl HeadlineFeed {
    pub fn spawn(pipeline: Arc<AnalysisPipeline>, interval: Duration, initial: Option<HeadlineSet>) -> Self {
        let refreshed_at = initial.as_ref().map(|_| Utc::now());
        let (sender, receiver) = watch::channel(FeedSnapshot { headlines: initial, refreshed_at, failures: 0 });

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; the caller already fetched.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match pipeline.discover_headlines().await {
                    Ok(set) => {
                        tracing::info!("🔄 Headlines refreshed ({} total)", set.len());
                        sender.send_modify(|snapshot| {
                            snapshot.headlines = Some(set);
                            snapshot.refreshed_at = Some(Utc::now());
                            snapshot.failures = 0;
                        });
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Background headline refresh failed, keeping previous set: {}", e);
                        sender.send_modify(|snapshot| snapshot.failures += 1);
                    }
                }
                if sender.is_closed() {
                    break;
                }
            }
        });

        Self { receiver, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.receiver.clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.receiver.borrow().clone()
    }
}

impl Drop for HeadlineFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
