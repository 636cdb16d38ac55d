use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::models::{Event, NotifyThreshold};
use crate::database::store::NotificationStore;
use crate::delivery::{DeliveryGateway, DeliveryReport};
use crate::messages;

/// Outcome of a single scheduler tick, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Events that received a 24-hour reminder broadcast this tick.
    pub reminders_24h: usize,
    /// Events that received a 1-hour reminder broadcast this tick.
    pub reminders_1h: usize,
    /// Events whose recording notice was broadcast this tick.
    pub recordings: usize,
    /// Per-recipient delivery counts aggregated over all broadcasts.
    pub deliveries: DeliveryReport,
    /// Flag writes that failed; those events re-broadcast next tick.
    pub flag_write_failures: usize,
    /// Threshold scans skipped because the store read failed.
    pub skipped_thresholds: usize,
}

impl TickReport {
    /// Events notified across all three thresholds.
    pub fn total_events(&self) -> usize {
        self.reminders_24h + self.reminders_1h + self.recordings
    }
}

/// Periodic notification scheduler with injected store and gateway.
///
/// Owns the cron registration; the actual scan-deliver-mark cycle lives in
/// [`run_notification_tick`] so tests can drive it with fake dependencies.
pub struct NotifierService {
    store: Arc<dyn NotificationStore>,
    gateway: Arc<dyn DeliveryGateway>,
    scheduler: JobScheduler,
    interval_minutes: u32,
    tick_guard: Arc<Mutex<()>>,
}

impl NotifierService {
    pub async fn new(
        store: Arc<dyn NotificationStore>,
        gateway: Arc<dyn DeliveryGateway>,
        interval_minutes: u32,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            store,
            gateway,
            scheduler,
            interval_minutes,
            tick_guard: Arc::new(Mutex::new(())),
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let store = self.store.clone();
        let gateway = self.gateway.clone();
        let tick_guard = self.tick_guard.clone();
        // Window width matches the polling cadence so an event's threshold
        // instant always falls inside some tick's window.
        let tolerance = Duration::minutes(i64::from(self.interval_minutes));

        let cron = format!("0 */{} * * * *", self.interval_minutes);
        let tick_job = Job::new_async(cron.as_str(), move |_uuid, _l| {
            let store = store.clone();
            let gateway = gateway.clone();
            let tick_guard = tick_guard.clone();
            Box::pin(async move {
                // A slow tick must not overlap the next firing; skip instead.
                let Ok(_lock) = tick_guard.try_lock() else {
                    tracing::warn!("Previous notification tick still running, skipping");
                    return;
                };
                let report =
                    run_notification_tick(store.as_ref(), gateway.as_ref(), Utc::now(), tolerance)
                        .await;
                if report.total_events() > 0 || report.skipped_thresholds > 0 {
                    tracing::info!(
                        "Notification tick: {} events notified ({} deliveries, {} failed), {} thresholds skipped",
                        report.total_events(),
                        report.deliveries.sent,
                        report.deliveries.failed,
                        report.skipped_thresholds
                    );
                }
            })
        })?;

        self.scheduler.add(tick_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Notification service started - polling every {} minutes",
            self.interval_minutes
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing and operations
    pub async fn check_now(&self) -> TickReport {
        let _lock = self.tick_guard.lock().await;
        run_notification_tick(
            self.store.as_ref(),
            self.gateway.as_ref(),
            Utc::now(),
            Duration::minutes(i64::from(self.interval_minutes)),
        )
        .await
    }
}

/// One full scan-deliver-mark cycle.
///
/// Each threshold is evaluated independently; a store read failure skips
/// only that threshold until the next tick. The notified flag is written
/// after the broadcast attempt regardless of per-recipient outcome, and a
/// failed flag write is logged loudly but does not abort the tick. The
/// overall guarantee is at-least-once per event/threshold.
pub async fn run_notification_tick(
    store: &dyn NotificationStore,
    gateway: &dyn DeliveryGateway,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> TickReport {
    let mut report = TickReport::default();

    // Read fresh each tick so newly linked users are picked up immediately.
    let recipients = match store.list_recipient_identities().await {
        Ok(recipients) => recipients,
        Err(e) => {
            tracing::error!("Failed to load notification recipients, aborting tick: {}", e);
            report.skipped_thresholds = 3;
            return report;
        }
    };

    // 24-hour reminders
    match store
        .find_events_crossing_threshold(NotifyThreshold::Hours24, now, tolerance)
        .await
    {
        Ok(events) => {
            for event in events {
                let text = messages::reminder_24h(&event);
                let delivery = gateway.broadcast(&recipients, &text).await;
                report.deliveries.merge(delivery);
                mark_notified_or_log(store, &event, NotifyThreshold::Hours24, &mut report).await;
                report.reminders_24h += 1;
                tracing::info!("Sent 24h reminder for event: {}", event.title);
            }
        }
        Err(e) => {
            tracing::error!("24h reminder query failed, will retry next tick: {}", e);
            report.skipped_thresholds += 1;
        }
    }

    // 1-hour reminders
    match store
        .find_events_crossing_threshold(NotifyThreshold::Hour1, now, tolerance)
        .await
    {
        Ok(events) => {
            for event in events {
                let text = messages::reminder_1h(&event);
                let delivery = gateway.broadcast(&recipients, &text).await;
                report.deliveries.merge(delivery);
                mark_notified_or_log(store, &event, NotifyThreshold::Hour1, &mut report).await;
                report.reminders_1h += 1;
                tracing::info!("Sent 1h reminder for event: {}", event.title);
            }
        }
        Err(e) => {
            tracing::error!("1h reminder query failed, will retry next tick: {}", e);
            report.skipped_thresholds += 1;
        }
    }

    // Recording-available notices
    match store.find_events_with_unnotified_recording(now).await {
        Ok(events) => {
            for event in events {
                let text = messages::recording_ready(&event);
                let delivery = gateway.broadcast(&recipients, &text).await;
                report.deliveries.merge(delivery);
                mark_notified_or_log(store, &event, NotifyThreshold::Recording, &mut report).await;
                report.recordings += 1;
                tracing::info!("Sent recording notice for event: {}", event.title);
            }
        }
        Err(e) => {
            tracing::error!("Recording query failed, will retry next tick: {}", e);
            report.skipped_thresholds += 1;
        }
    }

    report
}

async fn mark_notified_or_log(
    store: &dyn NotificationStore,
    event: &Event,
    threshold: NotifyThreshold,
    report: &mut TickReport,
) {
    if let Err(e) = store.mark_notified(&event.id, threshold).await {
        // Until this write succeeds the event re-broadcasts every tick.
        tracing::error!(
            "Failed to mark event {} as notified ({:?}): {}",
            event.id,
            threshold,
            e
        );
        report.flag_write_failures += 1;
    }
}
