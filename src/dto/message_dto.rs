use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub recipient_id: Uuid,
    pub job_id: Option<Uuid>,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}
