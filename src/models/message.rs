use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub job_id: Option<Uuid>,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub job_id: Option<Uuid>,
    pub body: String,
}

/// Latest message exchanged with one counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub last_message: String,
    pub last_sender_id: Uuid,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
}
