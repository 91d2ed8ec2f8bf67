use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::message::{Conversation, CreateMessage, Message};
use crate::services::realtime_service::{RealtimeEvent, RealtimeHub};

pub const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
    hub: RealtimeHub,
}

impl MessageService {
    pub fn new(pool: PgPool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    pub async fn send(&self, msg: CreateMessage) -> Result<Message> {
        check_message(&msg)?;

        let recipient_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(msg.recipient_id)
                .fetch_one(&self.pool)
                .await?;
        if !recipient_exists.0 {
            return Err(Error::NotFound("Recipient not found".into()));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, job_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(msg.sender_id)
        .bind(msg.recipient_id)
        .bind(msg.job_id)
        .bind(msg.body.trim())
        .fetch_one(&self.pool)
        .await?;

        self.hub
            .publish(message.recipient_id, RealtimeEvent::new("message:new", &message));
        Ok(message)
    }

    /// Both directions of the exchange, oldest first. Inbound messages are
    /// marked read as a side effect.
    pub async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>> {
        self.mark_as_read(user_id, other_id).await?;

        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn mark_as_read(&self, user_id: Uuid, other_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE recipient_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            WITH exchanged AS (
                SELECT
                    CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS counterpart_id,
                    sender_id, recipient_id, body, read_at, created_at
                FROM messages
                WHERE sender_id = $1 OR recipient_id = $1
            ),
            latest AS (
                SELECT DISTINCT ON (counterpart_id)
                    counterpart_id, sender_id AS last_sender_id, body AS last_message,
                    created_at AS last_message_at
                FROM exchanged
                ORDER BY counterpart_id, created_at DESC
            )
            SELECT
                l.counterpart_id,
                u.name AS counterpart_name,
                l.last_message,
                l.last_sender_id,
                l.last_message_at,
                (SELECT COUNT(*) FROM exchanged e
                  WHERE e.counterpart_id = l.counterpart_id
                    AND e.recipient_id = $1 AND e.read_at IS NULL) AS unread_count
            FROM latest l
            JOIN users u ON u.id = l.counterpart_id
            ORDER BY l.last_message_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}

fn check_message(msg: &CreateMessage) -> Result<()> {
    if msg.sender_id == msg.recipient_id {
        return Err(Error::BadRequest("You cannot message yourself".into()));
    }
    let len = msg.body.trim().chars().count();
    if len == 0 {
        return Err(Error::BadRequest("Message body is required".into()));
    }
    if len > MAX_MESSAGE_LEN {
        return Err(Error::BadRequest(format!(
            "Message body must be at most {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: Uuid, recipient: Uuid, body: &str) -> CreateMessage {
        CreateMessage {
            sender_id: sender,
            recipient_id: recipient,
            job_id: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn self_messages_are_rejected() {
        let me = Uuid::new_v4();
        assert!(matches!(check_message(&msg(me, me, "hi")), Err(Error::BadRequest(_))));
    }

    #[test]
    fn body_must_be_non_blank_and_bounded() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(check_message(&msg(a, b, "   ")).is_err());
        assert!(check_message(&msg(a, b, &"x".repeat(MAX_MESSAGE_LEN))).is_ok());
        assert!(check_message(&msg(a, b, &"x".repeat(MAX_MESSAGE_LEN + 1))).is_err());
    }
}
