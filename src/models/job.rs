use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub currency: Option<String>,
    pub skills: Vec<String>,
    pub status: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub application_count: i64,
}

impl Job {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Active.as_str()
            && self.deadline.map(|d| d > now).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            "draft" => Ok(JobStatus::Draft),
            other => Err(format!("Invalid job status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(status: &str, deadline: Option<DateTime<Utc>>) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            company_id: None,
            title: "Backend Engineer".into(),
            description: "Build APIs".into(),
            location: "Remote".into(),
            employment_type: "full-time".into(),
            experience_level: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            skills: vec![],
            status: status.into(),
            deadline,
            created_at: now,
            updated_at: now,
            application_count: 0,
        }
    }

    #[test]
    fn open_requires_active_status_and_future_deadline() {
        let now = Utc::now();
        assert!(job("active", None).is_open(now));
        assert!(job("active", Some(now + Duration::days(1))).is_open(now));
        assert!(!job("active", Some(now - Duration::days(1))).is_open(now));
        assert!(!job("closed", None).is_open(now));
        assert!(!job("draft", None).is_open(now));
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert_eq!("CLOSED".parse::<JobStatus>().unwrap(), JobStatus::Closed);
        assert!("archived".parse::<JobStatus>().is_err());
    }
}
