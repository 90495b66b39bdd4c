//! Daily inventory-reset schedule.
//!
//! One static entry: at `hour:minute` in `timezone`, every day, enqueue the
//! reset task for the configured inventory item.

use std::sync::Arc;

use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use fruitsupply_core::{DocumentId, TaskId};

use crate::tasks::reset_inventory::reset_inventory_message;
use crate::tasks::{QueueError, TaskQueue};

#[derive(Debug, Clone, PartialEq)]
pub struct ResetSchedule {
    pub inventory_id: DocumentId,
    pub quantity: u64,
    pub hour: u32,
    pub minute: u32,
    pub timezone: Tz,
}

impl ResetSchedule {
    /// Six-field cron expression (seconds first).
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }

    /// Enqueue one reset with this entry's arguments.
    pub async fn fire(&self, queue: &dyn TaskQueue) -> Result<TaskId, QueueError> {
        queue
            .enqueue(reset_inventory_message(
                &self.inventory_id.to_string(),
                self.quantity,
            ))
            .await
    }

    /// First firing strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local_today = now.with_timezone(&self.timezone).date_naive();

        // Two days covers "already past today"; the third absorbs a DST gap.
        (0..3u64).find_map(|offset| {
            let date = local_today.checked_add_days(Days::new(offset))?;
            let local = date.and_hms_opt(self.hour, self.minute, 0)?;
            let at = self
                .timezone
                .from_local_datetime(&local)
                .earliest()?
                .with_timezone(&Utc);
            (at > now).then_some(at)
        })
    }
}

/// Build and start the scheduler.
///
/// The returned handle must be kept alive; `shutdown` it on exit. With no
/// schedule the scheduler still runs, empty.
pub async fn build_scheduler(
    queue: Arc<dyn TaskQueue>,
    schedule: Option<ResetSchedule>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match schedule {
        Some(schedule) => {
            let expr = schedule.cron_expression();
            info!(
                inventory_id = %schedule.inventory_id,
                quantity = schedule.quantity,
                cron = %expr,
                timezone = %schedule.timezone,
                next_run = ?schedule.next_run_after(Utc::now()),
                "registering daily inventory reset"
            );

            let tz = schedule.timezone;
            let schedule = Arc::new(schedule);
            let job = Job::new_async_tz(expr.as_str(), tz, move |_uuid, _scheduler| {
                let queue = queue.clone();
                let schedule = schedule.clone();
                Box::pin(async move {
                    match schedule.fire(queue.as_ref()).await {
                        Ok(task_id) => {
                            info!(task_id = %task_id, inventory_id = %schedule.inventory_id, "scheduled inventory reset queued")
                        }
                        Err(e) => error!(error = %e, "failed to queue scheduled inventory reset"),
                    }
                })
            })?;
            scheduler.add(job).await?;
        }
        None => {
            warn!("RESET_SCHEDULE_INVENTORY_ID not set; daily inventory reset disabled");
        }
    }

    scheduler.start().await?;
    Ok(scheduler)
}
