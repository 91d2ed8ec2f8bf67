use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::payment_service::PaymentService;

/// Every day at 03:00 UTC.
pub const SUBSCRIPTION_EXPIRY_CRON: &str = "0 0 3 * * *";

/// Starts the background scheduler. The returned handle must be kept alive
/// for the jobs to keep firing.
pub async fn start(payments: PaymentService) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("failed to create scheduler: {:?}", e))?;

    let expiry_job = Job::new_async(SUBSCRIPTION_EXPIRY_CRON, move |_id, _lock| {
        let payments = payments.clone();
        Box::pin(async move {
            match payments.expire_subscriptions().await {
                Ok(0) => tracing::debug!("no subscriptions expired"),
                Ok(expired) => tracing::info!(expired, "subscriptions marked expired"),
                Err(e) => tracing::error!(error = ?e, "subscription expiry job failed"),
            }
        })
    })
    .map_err(|e| anyhow::anyhow!("invalid expiry schedule: {:?}", e))?;

    scheduler
        .add(expiry_job)
        .await
        .map_err(|e| anyhow::anyhow!("failed to register expiry job: {:?}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start scheduler: {:?}", e))?;

    tracing::info!(schedule = SUBSCRIPTION_EXPIRY_CRON, "subscription expiry job scheduled");
    Ok(scheduler)
}
