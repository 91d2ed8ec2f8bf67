use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub profile_snapshot: Option<JsonValue>,
    pub fit_score: i32,
    pub employer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application joined with the job title and applicant name for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationDetail {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub employer_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub status: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub profile_snapshot: Option<JsonValue>,
    pub fit_score: i32,
    pub employer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid application status '{}'; expected one of Pending, Reviewed, Accepted, Rejected",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive_but_strict() {
        assert_eq!(
            "accepted".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Accepted
        );
        assert_eq!(
            "Reviewed".parse::<ApplicationStatus>().unwrap().as_str(),
            "Reviewed"
        );
        assert!("Shortlisted".parse::<ApplicationStatus>().is_err());
        assert!("".parse::<ApplicationStatus>().is_err());
    }
}
