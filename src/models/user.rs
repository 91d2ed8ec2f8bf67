use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub otp_hash: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub otp_attempts: i32,
    #[serde(skip_serializing)]
    pub otp_sent_at: Option<DateTime<Utc>>,
    pub subscription_plan: Option<String>,
    pub subscription_status: String,
    pub subscription_started_at: Option<DateTime<Utc>>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }

    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscription_status == "active"
            && self.subscription_expires_at.map(|exp| exp > now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Seeker,
    Employer,
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Seeker => "seeker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seeker" => Ok(UserRole::Seeker),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Employer".parse::<UserRole>().unwrap(), UserRole::Employer);
        assert_eq!(" seeker ".parse::<UserRole>().unwrap(), UserRole::Seeker);
        assert!("recruiter".parse::<UserRole>().is_err());
    }

    #[test]
    fn admin_is_not_self_assignable() {
        assert!(!UserRole::Admin.is_self_assignable());
        assert!(UserRole::Student.is_self_assignable());
    }
}
