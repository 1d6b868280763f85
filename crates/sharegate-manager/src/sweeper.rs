use sharegate_core::ShareLinks;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodically purges links that expired more than `retention` ago.
pub struct Sweeper {
    links: Arc<dyn ShareLinks>,
    interval: Duration,
    retention: Duration,
}

impl Sweeper {
    pub fn new(links: Arc<dyn ShareLinks>, interval: Duration, retention: Duration) -> Self {
        Self {
            links,
            interval,
            retention,
        }
    }

    /// Runs one sweep. Failures are logged and reported as `None`.
    pub async fn sweep_once(&self) -> Option<u64> {
        match self.links.sweep_expired(self.retention).await {
            Ok(purged) => {
                debug!(purged, "sweep finished");
                Some(purged)
            }
            Err(e) => {
                warn!(error = %e, "failed to sweep expired share links");
                None
            }
        }
    }

    /// Sweeps on every tick until `shutdown` is cancelled.
    ///
    /// The first sweep runs immediately.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval = ?self.interval,
            retention = ?self.retention,
            "starting expired link sweeper"
        );

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        info!("expired link sweeper stopped");
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManagerSettings, ShareLinkManager};
    use jiff::{SignedDuration, Timestamp};
    use sharegate_core::{AllowAll, CreateParams, ManualClock, OwnerId, SubjectId};
    use sharegate_generator::SeqGenerator;
    use sharegate_storage::InMemoryRepository;

    fn manager(clock: &ManualClock) -> Arc<dyn ShareLinks> {
        Arc::new(ShareLinkManager::new(
            InMemoryRepository::new(),
            SeqGenerator::with_prefix("sg"),
            AllowAll,
            Arc::new(clock.clone()),
            ManagerSettings::builder()
                .origin("https://share.example.org")
                .build(),
        ))
    }

    async fn create(links: &Arc<dyn ShareLinks>, ttl: Duration) {
        links
            .create(
                &OwnerId::new("alice").unwrap(),
                CreateParams {
                    subject_ids: vec![SubjectId::new("moca-2026-04").unwrap()],
                    ttl,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_once_reports_purged_count() {
        let clock = ManualClock::new("2026-04-01T00:00:00Z".parse::<Timestamp>().unwrap());
        let links = manager(&clock);
        create(&links, Duration::from_secs(60)).await;
        create(&links, Duration::from_secs(3600)).await;

        let sweeper = Sweeper::new(
            Arc::clone(&links),
            Duration::from_secs(60),
            Duration::from_secs(600),
        );

        assert_eq!(sweeper.sweep_once().await, Some(0));
        clock.advance(SignedDuration::from_mins(30));
        assert_eq!(sweeper.sweep_once().await, Some(1));
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let clock = ManualClock::new("2026-04-01T00:00:00Z".parse::<Timestamp>().unwrap());
        let links = manager(&clock);
        create(&links, Duration::from_secs(60)).await;
        clock.advance(SignedDuration::from_hours(1));

        let shutdown = CancellationToken::new();
        let handle = Sweeper::new(
            Arc::clone(&links),
            Duration::from_millis(10),
            Duration::ZERO,
        )
        .spawn(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let remaining = links
            .list_for_owner(&OwnerId::new("alice").unwrap())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
