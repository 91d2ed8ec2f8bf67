use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::envelope::{Page, Paginated};
use crate::error::{Error, Result};
use crate::models::notification::{CreateNotification, Notification};
use crate::services::realtime_service::{RealtimeEvent, RealtimeHub};

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    hub: RealtimeHub,
}

impl NotificationService {
    pub fn new(pool: PgPool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    /// Stores the notification and pushes it to the recipient's live sockets.
    pub async fn create(&self, input: CreateNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, kind, title, body, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.recipient_id)
        .bind(input.kind.as_str())
        .bind(&input.title)
        .bind(&input.body)
        .bind(&input.link)
        .fetch_one(&self.pool)
        .await?;

        self.hub.publish(
            notification.recipient_id,
            RealtimeEvent::new("notification:new", &notification),
        );
        Ok(notification)
    }

    /// Failure to notify never fails the action that triggered it.
    pub async fn notify(&self, input: CreateNotification) {
        let recipient = input.recipient_id;
        if let Err(err) = self.create(input).await {
            tracing::warn!(%recipient, error = %err, "failed to store notification");
        }
    }

    pub async fn list(&self, recipient_id: Uuid, page: Page) -> Result<Paginated<Notification>> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recipient_id)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, total.0, page))
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<Notification> {
        let existing = self.get_owned(id, recipient_id).await?;
        if existing.is_read {
            return Ok(existing);
        }
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        self.hub.publish(
            recipient_id,
            RealtimeEvent::new("notification:all_read", json!({ "updated": result.rows_affected() })),
        );
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid, recipient_id: Uuid) -> Result<()> {
        self.get_owned(id, recipient_id).await?;
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, recipient_id: Uuid) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Notification not found".into()))?;
        if notification.recipient_id != recipient_id {
            return Err(Error::Forbidden("Not your notification".into()));
        }
        Ok(notification)
    }
}
