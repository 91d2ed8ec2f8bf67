use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub uploaded_by: Uuid,
    pub name: String,
    pub email: String,
    pub course: String,
    pub institution: Option<String>,
    pub grade: Option<String>,
    pub completion_date: Option<NaiveDate>,
    pub certificate_id: String,
    pub pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated row ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub institution: Option<String>,
    pub grade: Option<String>,
    pub completion_date: Option<NaiveDate>,
}
