//! Background job scheduler.
//!
//! Runs the full campaign video sync on the configured cron schedule.

use std::sync::Arc;

use campsync_sync::{SyncRequest, SyncRunner, TriggerSource};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    runner: Arc<SyncRunner>,
    sync_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_sync_job(&scheduler, runner, sync_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sync_job(
    scheduler: &JobScheduler,
    runner: Arc<SyncRunner>,
    sync_cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(sync_cron, move |_uuid, _lock| {
        let runner = Arc::clone(&runner);

        Box::pin(async move {
            tracing::info!("scheduler: starting campaign video sync");
            match runner
                .run(&SyncRequest::default(), TriggerSource::Scheduler)
                .await
            {
                Ok(report) => tracing::info!(
                    brands = report.total_brands_processed,
                    matched = report.total_videos_matched,
                    unmatched = report.total_videos_unmatched,
                    "scheduler: campaign video sync complete"
                ),
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "scheduler: campaign video sync failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = sync_cron, "scheduler: registered campaign video sync job");
    Ok(())
}
